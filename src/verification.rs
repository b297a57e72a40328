//! Request and result types exchanged across the verification boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Response codes understood by the notary host.
///
/// The set is closed: a backend can only answer with a code the host knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum ResponseCode {
    /// The fingerprint is confirmed valid for the target.
    Verified,
    /// The fingerprint conflicts with what the backend believes is valid.
    Conflict,
}

impl ResponseCode {
    /// Wire value of the code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        match self {
            Self::Verified => 200,
            Self::Conflict => 409,
        }
    }
}

impl From<ResponseCode> for u16 {
    fn from(code: ResponseCode) -> Self {
        code.as_u16()
    }
}

impl TryFrom<u16> for ResponseCode {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            200 => Ok(Self::Verified),
            409 => Ok(Self::Conflict),
            other => Err(format!("unknown response code {other}")),
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// A single "is this fingerprint valid for this target" question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRequest {
    /// Target host name.
    pub host: String,
    /// Target port.
    pub port: u16,
    /// Resolved address to use instead of resolving `host`, if the caller has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Fingerprint observed for the target.
    pub fingerprint: String,
}

impl VerificationRequest {
    /// Create a request without a pre-resolved address.
    pub fn new(host: impl Into<String>, port: u16, fingerprint: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            address: None,
            fingerprint: fingerprint.into(),
        }
    }

    /// Use `address` instead of resolving the host name.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// `host:port` form of the target, used in logs and as a lookup key.
    #[must_use]
    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// A backend's answer to a [`VerificationRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Response code.
    pub code: ResponseCode,
    /// Fingerprint the host should cache for the target, if the backend has one.
    #[serde(rename = "fingerprint", default)]
    pub fingerprint_to_cache: Option<String>,
}

impl VerificationResult {
    /// The fingerprint is valid; cache `fingerprint`.
    pub fn verified(fingerprint: impl Into<String>) -> Self {
        Self {
            code: ResponseCode::Verified,
            fingerprint_to_cache: Some(fingerprint.into()),
        }
    }

    /// The fingerprint conflicts; optionally name the one to cache instead.
    #[must_use]
    pub const fn conflict(fingerprint_to_cache: Option<String>) -> Self {
        Self {
            code: ResponseCode::Conflict,
            fingerprint_to_cache,
        }
    }

    /// Returns true if the backend confirmed the fingerprint.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.code == ResponseCode::Verified
    }
}
