//! Verifier host - owns the running backend and applies host policy.
//!
//! The backend contract does not promise that `verify` terminates, so the
//! host bounds every call with its own timeout. A call that outlives the
//! bound is dropped and reported as a failure, whatever the backend would
//! have answered later.

use crate::backend::Backend;
use crate::config::HostConfig;
use crate::error::{Error, Result};
use crate::event::{create_event_channel, HostEvent, HostEventsChannel, HostEventsSender};
use crate::info::{InfoRenderer, RequestContext};
use crate::registry::BackendRegistry;
use crate::verification::{ResponseCode, VerificationRequest, VerificationResult};
use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How the host classifies the outcome of one verification.
#[derive(Debug)]
pub enum HostVerdict {
    /// The backend answered, positively or with a conflict.
    Answer(VerificationResult),
    /// The backend gave no trustworthy answer.
    Unknown(Error),
}

impl From<Result<VerificationResult>> for HostVerdict {
    fn from(result: Result<VerificationResult>) -> Self {
        match result {
            Ok(answer) => Self::Answer(answer),
            Err(e) => Self::Unknown(e),
        }
    }
}

/// Verification statistics for monitoring.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HostStats {
    /// Requests the backend confirmed.
    pub verified: u64,
    /// Requests the backend answered with a conflict.
    pub conflicts: u64,
    /// Requests that failed inside the backend.
    pub failures: u64,
    /// Requests that timed out, in the host or inside the backend.
    pub timeouts: u64,
}

impl HostStats {
    /// Total requests seen.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.verified + self.conflicts + self.failures + self.timeouts
    }

    /// Share of requests that got an answer, as a percentage.
    #[must_use]
    pub fn answer_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            ((self.verified + self.conflicts) as f64 / total as f64) * 100.0
        }
    }
}

/// Generic info page the host serves when a backend has no custom one.
#[must_use]
pub fn generic_info_page(backend: &dyn Backend) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><title>Notary</title></head>\
         <body><h1>Notary</h1>{}</body></html>\n",
        backend.render_description()
    )
}

/// Owns one backend instance and serves requests against it.
pub struct VerifierHost {
    backend: RwLock<Arc<dyn Backend>>,
    registry: BackendRegistry,
    renderer: InfoRenderer,
    verify_timeout: Duration,
    stats: Mutex<HostStats>,
    events_tx: HostEventsSender,
    _events_rx: HostEventsChannel,
}

impl VerifierHost {
    /// Construct the configured backend and bring the host up.
    ///
    /// # Errors
    ///
    /// Returns the backend's configuration error; the host does not start
    /// with a backend it could not configure.
    pub fn new(config: &HostConfig, registry: BackendRegistry) -> Result<Self> {
        let backend = registry.construct(&config.backend, config.options.as_deref())?;
        Ok(Self::with_backend(backend, config, registry))
    }

    /// Host around an already constructed backend.
    #[must_use]
    pub fn with_backend(
        backend: Arc<dyn Backend>,
        config: &HostConfig,
        registry: BackendRegistry,
    ) -> Self {
        let (events_tx, events_rx) = create_event_channel();
        info!(
            backend = backend.name(),
            timeout_secs = config.verify_timeout_secs,
            "Verifier host started"
        );
        let _ = events_tx.send(HostEvent::BackendLoaded {
            backend: backend.name().to_string(),
        });

        Self {
            backend: RwLock::new(backend),
            registry,
            renderer: config.renderer(),
            verify_timeout: config.verify_timeout(),
            stats: Mutex::new(HostStats::default()),
            events_tx,
            _events_rx: events_rx,
        }
    }

    /// The running backend.
    #[must_use]
    pub fn backend(&self) -> Arc<dyn Backend> {
        self.backend.read().clone()
    }

    /// Subscribe to host events.
    #[must_use]
    pub fn subscribe_events(&self) -> HostEventsChannel {
        self.events_tx.subscribe()
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> HostStats {
        self.stats.lock().clone()
    }

    /// Host timeout for one verification.
    #[must_use]
    pub fn verify_timeout(&self) -> Duration {
        self.verify_timeout
    }

    /// Run `request` against the backend, bounded by the host timeout.
    ///
    /// # Errors
    ///
    /// Returns the backend's error, or [`Error::Timeout`] if the backend did
    /// not resolve in time.
    pub async fn verify(&self, request: &VerificationRequest) -> Result<VerificationResult> {
        let backend = self.backend();
        let target = request.target();
        debug!(endpoint = %target, backend = backend.name(), "Verifying");

        let outcome = tokio::time::timeout(self.verify_timeout, backend.verify(request)).await;

        match outcome {
            Ok(Ok(result)) => {
                let mut stats = self.stats.lock();
                match result.code {
                    ResponseCode::Verified => stats.verified += 1,
                    ResponseCode::Conflict => stats.conflicts += 1,
                }
                Ok(result)
            }
            Ok(Err(e @ Error::Timeout(_))) => {
                warn!(endpoint = %target, "Backend gave up waiting: {e}");
                self.stats.lock().timeouts += 1;
                let _ = self
                    .events_tx
                    .send(HostEvent::VerificationTimedOut { target });
                Err(e)
            }
            Ok(Err(e)) => {
                warn!(endpoint = %target, "Verification failed: {e}");
                self.stats.lock().failures += 1;
                let _ = self.events_tx.send(HostEvent::VerificationFailed {
                    target,
                    reason: e.to_string(),
                });
                Err(e)
            }
            Err(_) => {
                warn!(endpoint = %target, timeout = ?self.verify_timeout, "Verification timed out");
                self.stats.lock().timeouts += 1;
                let _ = self
                    .events_tx
                    .send(HostEvent::VerificationTimedOut { target });
                Err(Error::Timeout(self.verify_timeout))
            }
        }
    }

    /// Verify a batch concurrently. Results come back in request order.
    pub async fn verify_all(
        &self,
        requests: &[VerificationRequest],
    ) -> Vec<Result<VerificationResult>> {
        join_all(requests.iter().map(|request| self.verify(request))).await
    }

    /// Like [`Self::verify`], classified for the host's decision logic.
    pub async fn verdict(&self, request: &VerificationRequest) -> HostVerdict {
        self.verify(request).await.into()
    }

    /// Info page body for a read-only request.
    #[must_use]
    pub fn info(&self, ctx: &RequestContext) -> String {
        let backend = self.backend();
        backend
            .info_node(&self.renderer, ctx)
            .into_html(|| generic_info_page(backend.as_ref()))
    }

    /// Replace the running backend.
    ///
    /// Requests already in flight finish on the old instance.
    ///
    /// # Errors
    ///
    /// Returns the new backend's configuration error; the old backend keeps
    /// serving in that case.
    pub fn reload(&self, name: &str, options: Option<&str>) -> Result<()> {
        match self.registry.construct(name, options) {
            Ok(backend) => {
                let backend_name = backend.name().to_string();
                *self.backend.write() = backend;
                info!(backend = %backend_name, "Backend reloaded");
                let _ = self.events_tx.send(HostEvent::BackendReloaded {
                    backend: backend_name,
                });
                Ok(())
            }
            Err(e) => {
                warn!("Reload failed, keeping current backend: {e}");
                let _ = self.events_tx.send(HostEvent::ReloadFailed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }
}
