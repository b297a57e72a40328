//! Certificate fingerprint helpers.
//!
//! Notaries exchange fingerprints as colon-separated upper-case hex
//! (`AB:CD:...`). Callers are not always consistent about case or
//! separators, so comparisons go through [`normalize`].

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};

const PEM_BEGIN: &str = "-----BEGIN CERTIFICATE-----";
const PEM_END: &str = "-----END CERTIFICATE-----";

/// Format raw digest bytes as `AB:CD:...`.
#[must_use]
pub fn format_colon_hex(bytes: &[u8]) -> String {
    let hex = hex::encode_upper(bytes);
    let mut out = String::with_capacity(hex.len() + hex.len() / 2);
    for (i, pair) in hex.as_bytes().chunks(2).enumerate() {
        if i > 0 {
            out.push(':');
        }
        out.extend(pair.iter().map(|&b| char::from(b)));
    }
    out
}

/// SHA-256 fingerprint of DER-encoded certificate bytes.
#[must_use]
pub fn sha256_fingerprint(der: &[u8]) -> String {
    format_colon_hex(&Sha256::digest(der))
}

/// Canonical comparison form: lower-case hex digits only.
#[must_use]
pub fn normalize(fingerprint: &str) -> String {
    fingerprint
        .chars()
        .filter(char::is_ascii_hexdigit)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Returns true if both fingerprints name the same digest.
#[must_use]
pub fn matches(a: &str, b: &str) -> bool {
    let (a, b) = (normalize(a), normalize(b));
    !a.is_empty() && a == b
}

/// Extract DER certificates from `data`, which is either PEM text or raw DER.
///
/// # Errors
///
/// Returns [`Error::Certificate`] if PEM armour is present but malformed.
pub fn certificates_from_bytes(data: &[u8]) -> Result<Vec<Vec<u8>>> {
    let Ok(text) = std::str::from_utf8(data) else {
        return Ok(vec![data.to_vec()]);
    };
    if !text.contains(PEM_BEGIN) {
        return Ok(vec![data.to_vec()]);
    }

    let mut certs = Vec::new();
    let mut body: Option<String> = None;
    for line in text.lines().map(str::trim) {
        if line == PEM_BEGIN {
            body = Some(String::new());
        } else if line == PEM_END {
            let encoded = body
                .take()
                .ok_or_else(|| Error::Certificate("PEM end marker without begin".to_string()))?;
            let der = STANDARD
                .decode(encoded)
                .map_err(|e| Error::Certificate(format!("invalid PEM body: {e}")))?;
            certs.push(der);
        } else if let Some(encoded) = body.as_mut() {
            encoded.push_str(line);
        }
    }

    if body.is_some() {
        return Err(Error::Certificate("unterminated PEM certificate".to_string()));
    }
    Ok(certs)
}
