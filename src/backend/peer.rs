//! Backend that asks another notary.
//!
//! The peer is queried with `POST {url}/target/{host}+{port}` and a form
//! body `fingerprint=<fp>`. It answers `200` when it agrees and `409` when
//! it does not, listing the fingerprints it has observed for the target:
//!
//! ```json
//! {"fingerprintList": [
//!     {"timestamp": {"start": "1300000000", "finish": "1310000000"},
//!      "fingerprint": "AB:CD:..."}
//! ]}
//! ```
//!
//! The most recently observed fingerprint is the one to cache. Anything
//! else from the peer, or no answer within the timeout, is a failure.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::options::OptionMap;
use crate::registry::Factory;
use crate::verification::{VerificationRequest, VerificationResult};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const OPTIONS: &str = "\
url=<http(s) url>     base URL of the peer notary (required)
timeout=<seconds>     per-query timeout, fractional allowed (default 10)
description=<text>    text shown on the info page";

/// Default per-query timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct PeerResponse {
    #[serde(rename = "fingerprintList", default)]
    fingerprint_list: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    #[serde(default)]
    timestamp: Option<ObservedSpan>,
    fingerprint: String,
}

#[derive(Debug, Deserialize)]
struct ObservedSpan {
    #[serde(default)]
    finish: Option<Stamp>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Stamp {
    Number(u64),
    Text(String),
}

impl Observation {
    fn last_seen(&self) -> u64 {
        match self.timestamp.as_ref().and_then(|t| t.finish.as_ref()) {
            Some(Stamp::Number(n)) => *n,
            Some(Stamp::Text(s)) => s.trim().parse().unwrap_or(0),
            None => 0,
        }
    }
}

/// Verifies by consulting a remote notary.
#[derive(Debug, Clone)]
pub struct PeerVerifier {
    url: Url,
    timeout: Duration,
    client: reqwest::Client,
    description: Option<String>,
}

impl PeerVerifier {
    /// Type name.
    pub const NAME: &'static str = "PeerVerifier";

    /// Construct from options.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `url` is missing or not http(s),
    /// `timeout` is not a positive number of seconds, or options are unknown.
    pub fn new(options: Option<&str>) -> Result<Self> {
        let mut map = OptionMap::parse(Self::NAME, options)?;

        let raw_url = map
            .take_str("url")?
            .ok_or_else(|| map.error("requires a url option."))?;
        let url = Url::parse(&raw_url)
            .map_err(|e| map.error(format!("got invalid url '{raw_url}': {e}.")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(map.error(format!("only supports http(s) peers, got '{raw_url}'.")));
        }

        let timeout = match map.take_parsed::<f64>("timeout")? {
            None => DEFAULT_TIMEOUT,
            Some(secs) if secs.is_finite() && secs > 0.0 => Duration::try_from_secs_f64(secs)
                .map_err(|e| map.error(format!("got unusable timeout {secs}: {e}.")))?,
            Some(secs) => return Err(map.error(format!("got non-positive timeout {secs}."))),
        };
        let description = map.take_str("description")?;
        map.finish()?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::configuration(Self::NAME, format!("could not build client: {e}.")))?;

        info!(peer = %url, ?timeout, "Peer verifier configured");
        Ok(Self {
            url,
            timeout,
            client,
            description,
        })
    }

    /// Peer base URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Per-query timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `{url}/target/{host}+{port}`, with the target pushed as one
    /// percent-encoded path segment.
    fn target_url(&self, request: &VerificationRequest) -> Result<Url> {
        let mut url = self.url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Verification(format!("peer url {} cannot take a path", self.url)))?
            .pop_if_empty()
            .push("target")
            .push(&format!("{}+{}", request.host, request.port));
        Ok(url)
    }

    async fn query(&self, request: &VerificationRequest) -> Result<VerificationResult> {
        let url = self.target_url(request)?;
        debug!(url = %url, "Querying peer notary");

        let response = self
            .client
            .post(url)
            .form(&[("fingerprint", request.fingerprint.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(self.timeout)
                } else {
                    Error::Verification(format!("peer request failed: {e}"))
                }
            })?;

        match response.status() {
            StatusCode::OK => Ok(VerificationResult::verified(request.fingerprint.clone())),
            StatusCode::CONFLICT => {
                let body: PeerResponse = response
                    .json()
                    .await
                    .map_err(|e| Error::Verification(format!("malformed peer response: {e}")))?;
                let latest = body
                    .fingerprint_list
                    .into_iter()
                    .max_by_key(Observation::last_seen)
                    .map(|o| o.fingerprint);
                Ok(VerificationResult::conflict(latest))
            }
            status => Err(Error::Verification(format!("peer answered {status}"))),
        }
    }
}

#[async_trait]
impl Backend for PeerVerifier {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    async fn verify(&self, request: &VerificationRequest) -> Result<VerificationResult> {
        if request.address.is_some() {
            debug!(target_host = %request.host, "Peer protocol carries no address; peer resolves the host itself");
        }

        match tokio::time::timeout(self.timeout, self.query(request)).await {
            Ok(Ok(result)) => {
                debug!(endpoint = %request.target(), code = %result.code, "Peer answered");
                Ok(result)
            }
            Ok(Err(e)) => {
                warn!(endpoint = %request.target(), "Peer query failed: {e}");
                Err(e)
            }
            Err(_) => {
                warn!(endpoint = %request.target(), "Peer query timed out");
                Err(Error::Timeout(self.timeout))
            }
        }
    }
}

fn verifier(options: Option<&str>) -> Result<Arc<dyn Backend>> {
    Ok(Arc::new(PeerVerifier::new(options)?))
}

/// Registry entry.
pub const VERIFIER: Factory = Factory {
    name: "peer",
    options_description: Some(OPTIONS),
    construct: verifier,
};
