//! Local pin-list backend.
//!
//! Answers from a fixed list of `(host, port) -> fingerprint` pins given
//! inline or in a TOML file. No network I/O happens during verification.
//!
//! Pin file format:
//!
//! ```toml
//! [[pin]]
//! host = "example.org"
//! port = 443
//! fingerprint = "AB:CD:EF:..."
//! ```

use crate::backend::Backend;
use crate::error::Result;
use crate::fingerprint;
use crate::options::OptionMap;
use crate::registry::Factory;
use crate::verification::{VerificationRequest, VerificationResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

const OPTIONS: &str = "\
pin=<host>:<port>/<fingerprint>  pin a fingerprint (repeatable)
file=<path>                      TOML file with [[pin]] tables (repeatable)
description=<text>               text shown on the info page";

#[derive(Debug, Deserialize)]
struct PinFile {
    #[serde(default, rename = "pin")]
    pins: Vec<PinEntry>,
}

#[derive(Debug, Deserialize)]
struct PinEntry {
    host: String,
    port: u16,
    fingerprint: String,
}

/// Verifies fingerprints against a local pin list.
#[derive(Debug, Clone)]
pub struct PinnedVerifier {
    pins: HashMap<(String, u16), Vec<String>>,
    description: Option<String>,
}

impl PinnedVerifier {
    /// Type name.
    pub const NAME: &'static str = "PinnedVerifier";

    /// Construct from options. Pin files are read here, not on first use.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for malformed pins, unreadable pin
    /// files, unknown options, or when no pins are configured at all.
    pub fn new(options: Option<&str>) -> Result<Self> {
        let mut map = OptionMap::parse(Self::NAME, options)?;
        let mut verifier = Self {
            pins: HashMap::new(),
            description: map.take_str("description")?,
        };

        for pin in map.take_all("pin") {
            let (host, port, fp) = parse_inline_pin(&pin)
                .ok_or_else(|| map.error(format!("got malformed pin '{pin}'.")))?;
            verifier.add_pin(host, port, fp);
        }

        for path in map.take_all("file") {
            let file = load_pin_file(Path::new(&path))
                .map_err(|reason| map.error(format!("could not load pin file {path}: {reason}.")))?;
            for entry in file.pins {
                verifier.add_pin(&entry.host, entry.port, &entry.fingerprint);
            }
        }

        if verifier.pins.is_empty() {
            return Err(map.error("needs at least one pin (pin=... or file=...)."));
        }
        map.finish()?;

        debug!(targets = verifier.pins.len(), "Pinned verifier loaded");
        Ok(verifier)
    }

    fn add_pin(&mut self, host: &str, port: u16, fingerprint: &str) {
        self.pins
            .entry((host.to_ascii_lowercase(), port))
            .or_default()
            .push(fingerprint.trim().to_string());
    }

    /// Number of pinned targets.
    #[must_use]
    pub fn target_count(&self) -> usize {
        self.pins.len()
    }
}

fn parse_inline_pin(pin: &str) -> Option<(&str, u16, &str)> {
    let (target, fp) = pin.split_once('/')?;
    let (host, port) = target.rsplit_once(':')?;
    let port = port.parse().ok()?;
    if host.is_empty() || fingerprint::normalize(fp).is_empty() {
        return None;
    }
    Some((host, port, fp))
}

fn load_pin_file(path: &Path) -> std::result::Result<PinFile, String> {
    let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    toml::from_str(&content).map_err(|e| e.to_string())
}

#[async_trait]
impl Backend for PinnedVerifier {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    async fn verify(&self, request: &VerificationRequest) -> Result<VerificationResult> {
        let key = (request.host.to_ascii_lowercase(), request.port);
        let Some(pinned) = self.pins.get(&key) else {
            debug!(endpoint = %request.target(), "No pin for target");
            return Ok(VerificationResult::conflict(None));
        };

        let result = pinned
            .iter()
            .find(|fp| fingerprint::matches(fp, &request.fingerprint))
            .map_or_else(
                || VerificationResult::conflict(pinned.first().cloned()),
                |fp| VerificationResult::verified(fp.clone()),
            );
        debug!(endpoint = %request.target(), code = %result.code, "Pin check complete");
        Ok(result)
    }
}

fn verifier(options: Option<&str>) -> Result<Arc<dyn Backend>> {
    Ok(Arc::new(PinnedVerifier::new(options)?))
}

/// Registry entry.
pub const VERIFIER: Factory = Factory {
    name: "pinned",
    options_description: Some(OPTIONS),
    construct: verifier,
};
