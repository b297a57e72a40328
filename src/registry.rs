//! Backend discovery.
//!
//! Every backend module exposes a single `pub const VERIFIER: Factory`.
//! That binding is the whole plugin mechanism: [`backends!`](crate::backends)
//! resolves `<module>::VERIFIER` by name, so a module without it does not
//! compile into a registry and a module with it needs nothing else.
//!
//! ```rust,ignore
//! let registry = notary_backend::backends![
//!     notary_backend::backend::pinned,
//!     my_crate::backends::ocsp,
//! ];
//! let backend = registry.construct("pinned", Some("pin=example.org:443/AB:CD"))?;
//! ```

use crate::backend::Backend;
use crate::error::{Error, Result};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Builds a backend from its options string.
pub type Constructor = fn(Option<&str>) -> Result<Arc<dyn Backend>>;

/// The binding a backend module exports as `VERIFIER`.
#[derive(Clone, Copy)]
pub struct Factory {
    /// Name the host selects the backend by.
    pub name: &'static str,
    /// Option grammar, shown by the CLI.
    pub options_description: Option<&'static str>,
    /// Constructor.
    pub construct: Constructor,
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("name", &self.name)
            .field("options_description", &self.options_description)
            .finish_non_exhaustive()
    }
}

/// Build a [`BackendRegistry`] from backend module paths.
#[macro_export]
macro_rules! backends {
    ($($($segment:ident)::+),* $(,)?) => {
        $crate::registry::BackendRegistry::from_factories([
            $($($segment)::+::VERIFIER),*
        ])
    };
}

/// Backends known to the host, by name.
#[derive(Debug, Clone, Default)]
pub struct BackendRegistry {
    factories: Vec<Factory>,
}

impl BackendRegistry {
    /// Registry of the bundled backends.
    #[must_use]
    pub fn builtin() -> Self {
        crate::backends![crate::backend::base, crate::backend::pinned, crate::backend::peer]
    }

    /// Registry from a list of factories. Later entries replace earlier ones
    /// with the same name.
    pub fn from_factories(factories: impl IntoIterator<Item = Factory>) -> Self {
        let mut registry = Self::default();
        for factory in factories {
            registry.register(factory);
        }
        registry
    }

    /// Add a backend, replacing any registered under the same name.
    pub fn register(&mut self, factory: Factory) {
        self.factories.retain(|f| f.name != factory.name);
        self.factories.push(factory);
    }

    /// Look up a backend by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Factory> {
        self.factories.iter().find(|f| f.name == name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.iter().map(|f| f.name)
    }

    /// Registered factories, in registration order.
    #[must_use]
    pub fn factories(&self) -> &[Factory] {
        &self.factories
    }

    /// Construct the backend registered as `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownBackend`] if nothing is registered under
    /// `name`, or the backend's own configuration error.
    pub fn construct(&self, name: &str, options: Option<&str>) -> Result<Arc<dyn Backend>> {
        let factory = self
            .get(name)
            .ok_or_else(|| Error::UnknownBackend(name.to_string()))?;
        let backend = (factory.construct)(options)?;
        info!(
            registry_name = name,
            backend = backend.name(),
            with_options = options.is_some(),
            "Backend constructed"
        );
        Ok(backend)
    }
}
