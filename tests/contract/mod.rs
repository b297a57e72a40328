//! Contract tests run against every backend through the public API.
//!
//! These exercise the properties every backend and host must share,
//! independent of how a particular backend reaches its answer.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod concurrency;
mod rendering;

use notary_backend::{BackendRegistry, Error};

/// Backends registered without options must refuse any options string.
#[test]
fn optionless_backends_reject_options() {
    let registry = BackendRegistry::builtin();
    for factory in registry.factories() {
        if factory.options_description.is_some() {
            continue;
        }
        assert!(registry.construct(factory.name, None).is_ok());
        for options in ["", "x", "a=b"] {
            match registry.construct(factory.name, Some(options)) {
                Err(Error::Configuration { backend, .. }) => assert!(!backend.is_empty()),
                Err(other) => panic!("unexpected error for {}: {other}", factory.name),
                Ok(_) => panic!("{} accepted options {options:?}", factory.name),
            }
        }
    }
}

/// Backends that take options fail at construction on unknown keys.
#[test]
fn option_taking_backends_reject_unknown_keys() {
    let registry = BackendRegistry::builtin();
    let valid = [
        ("pinned", "pin=example.org:443/AA:BB"),
        ("peer", "url=https://notary.example.org"),
    ];
    for (name, options) in valid {
        assert!(registry.construct(name, Some(options)).is_ok(), "{name}");
        let err = registry
            .construct(name, Some(&format!("{options}; bogus=1")))
            .err()
            .expect("unknown key");
        assert!(err.is_configuration(), "{name}: {err}");
        assert!(err.to_string().contains("bogus"), "{name}: {err}");
    }
}
