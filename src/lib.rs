//! # notary-backend
//!
//! Pluggable verification backends for a certificate fingerprint notary.
//!
//! A notary answers clients asking "is this the right certificate for
//! `host:port`?". The decision itself is delegated to a backend: a local pin
//! list, another notary, or anything else that implements [`Backend`].
//!
//! ## Data Flow
//!
//! ```text
//! HostConfig ──► BackendRegistry::construct(name, options)
//!                       │  options parsed eagerly, errors are fatal
//!                       ▼
//!                Arc<dyn Backend> ◄── VerifierHost
//!                       │
//!        ┌──────────────┴───────────────┐
//!        ▼                              ▼
//!  verify(request)                 info_node(ctx)
//!  bounded by host timeout         template → raw file → generic page
//!        │
//!  Ok(VerificationResult) = answer (200 verified / 409 conflict)
//!  Err(Error)             = unknown
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use notary_backend::{BackendRegistry, HostConfig, VerificationRequest, VerifierHost};
//!
//! let config = HostConfig {
//!     backend: "pinned".into(),
//!     options: Some("pin=example.org:443/AB:CD:EF".into()),
//!     ..HostConfig::default()
//! };
//! let host = VerifierHost::new(&config, BackendRegistry::builtin())?;
//! let result = host
//!     .verify(&VerificationRequest::new("example.org", 443, "AB:CD:EF"))
//!     .await?;
//! assert!(result.is_verified());
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod event;
pub mod fingerprint;
pub mod host;
pub mod info;
pub mod options;
pub mod registry;
pub mod verification;

pub use backend::Backend;
pub use config::HostConfig;
pub use error::{Error, Result};
pub use event::{HostEvent, HostEventsChannel};
pub use host::{HostStats, HostVerdict, VerifierHost};
pub use info::{InfoRenderer, InfoResponse, Markup, RenderCapability, RequestContext};
pub use registry::{BackendRegistry, Factory};
pub use verification::{ResponseCode, VerificationRequest, VerificationResult};
