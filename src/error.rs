//! Error types for notary backends and the host harness.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for backend operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by backends, the options parser and the host.
#[derive(Debug, Error)]
pub enum Error {
    /// Backend options were invalid or not accepted.
    ///
    /// Fatal for bringing the backend online.
    #[error("This backend ({backend}) {reason}")]
    Configuration {
        /// Type name of the backend that rejected its options.
        backend: String,
        /// What was wrong with the options.
        reason: String,
    },

    /// The backend could not produce a trustworthy answer.
    #[error("verification failed: {0}")]
    Verification(String),

    /// The backend did not resolve within the allowed time.
    #[error("verification timed out after {0:?}")]
    Timeout(Duration),

    /// The backend does not implement verification.
    #[error("backend {backend} does not implement verify")]
    NotImplemented {
        /// Type name of the backend.
        backend: String,
    },

    /// No custom info page is available for the backend.
    #[error("no custom info rendering available")]
    InfoRenderingUnavailable,

    /// A template engine could not render the info template.
    #[error("template rendering failed: {0}")]
    Template(String),

    /// Certificate data could not be decoded.
    #[error("invalid certificate data: {0}")]
    Certificate(String),

    /// No backend is registered under the requested name.
    #[error("unknown backend: {0}")]
    UnknownBackend(String),

    /// Host configuration file could not be parsed or written.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a configuration error for `backend`.
    pub fn configuration(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            backend: backend.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the backend could not be brought online.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Returns true if this error means "no answer" for a verification request.
    ///
    /// Hosts must keep this apart from an explicit conflict result.
    #[must_use]
    pub const fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            Self::Verification(_) | Self::Timeout(_) | Self::NotImplemented { .. }
        )
    }
}
