//! The backend contract and the bundled backends.
//!
//! A backend answers one question for the notary host: is this fingerprint
//! currently valid for this `host:port`?
//!
//! # Contract
//!
//! - Construction parses the whole options string up front (see
//!   [`crate::options`]); bad options fail with
//!   [`Error::Configuration`](crate::Error::Configuration) before any request
//!   is served.
//! - [`Backend::verify`] resolves exactly once, to a
//!   [`VerificationResult`] or to an error. Errors mean "unknown" and are
//!   never replaced by a made-up result.
//! - One instance serves every request concurrently through `&self`. Any
//!   shared resource a backend keeps (an HTTP client, say) must tolerate
//!   concurrent use.
//! - Info rendering is synchronous and read-only.
//!
//! Each backend module exposes its [`Factory`](crate::registry::Factory)
//! as `VERIFIER`; see [`crate::registry`].

pub mod base;
pub mod peer;
pub mod pinned;

use crate::error::{Error, Result};
use crate::info::{default_description, InfoRenderer, InfoResponse, RequestContext};
use crate::verification::{VerificationRequest, VerificationResult};
use async_trait::async_trait;

pub use base::BaseVerifier;
pub use peer::PeerVerifier;
pub use pinned::PinnedVerifier;

/// A pluggable verification backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Backend type name, used in descriptions and error messages.
    fn name(&self) -> &str;

    /// Plain-text description. Escaped before it is shown as HTML.
    fn description(&self) -> Option<&str> {
        None
    }

    /// Fixed HTML description, shown as-is.
    fn html_description(&self) -> Option<&str> {
        None
    }

    /// Decide whether `request.fingerprint` is valid for the target.
    ///
    /// # Errors
    ///
    /// Returns an error if no trustworthy answer could be produced. The
    /// default implementation always returns [`Error::NotImplemented`].
    async fn verify(&self, _request: &VerificationRequest) -> Result<VerificationResult> {
        Err(Error::NotImplemented {
            backend: self.name().to_string(),
        })
    }

    /// Description markup for the info page.
    fn render_description(&self) -> String {
        default_description(self.name(), self.html_description(), self.description())
    }

    /// Info page for a read-only request.
    fn info_node(&self, renderer: &InfoRenderer, ctx: &RequestContext) -> InfoResponse {
        renderer.render(|| self.render_description(), ctx)
    }
}
