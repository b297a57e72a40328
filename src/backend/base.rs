//! The bare backend contract.
//!
//! Accepts no options and does not implement verification. Useful as the
//! default registry entry and as a reference for what every backend
//! inherits.

use crate::backend::Backend;
use crate::error::Result;
use crate::options::reject_options;
use crate::registry::Factory;
use std::sync::Arc;

/// Backend with nothing but the default contract.
#[derive(Debug, Clone, Default)]
pub struct BaseVerifier {
    _private: (),
}

impl BaseVerifier {
    /// Type name.
    pub const NAME: &'static str = "Verifier";

    /// Construct from options.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any options are given.
    pub fn new(options: Option<&str>) -> Result<Self> {
        reject_options(Self::NAME, options)?;
        Ok(Self::default())
    }
}

impl Backend for BaseVerifier {
    fn name(&self) -> &str {
        Self::NAME
    }
}

fn verifier(options: Option<&str>) -> Result<Arc<dyn Backend>> {
    Ok(Arc::new(BaseVerifier::new(options)?))
}

/// Registry entry.
pub const VERIFIER: Factory = Factory {
    name: "base",
    options_description: None,
    construct: verifier,
};
