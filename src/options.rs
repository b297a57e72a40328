//! Backend option parsing.
//!
//! Options arrive as a single optional string. Backends that take none call
//! [`reject_options`]; the bundled backends that do take options use the
//! `key=value` grammar parsed by [`OptionMap`]:
//!
//! ```text
//! url=https://notary.example.org; timeout=10
//! pin=example.org:443/AB:CD:..., pin=mail.example.org:993/01:23:...
//! ```
//!
//! Entries are separated by `;` or `,`. A `,` piece without `=` continues
//! the previous value, so free text such as `description=a, b` keeps its
//! comma; a `;` always ends the entry. Keys may repeat. Every key must be
//! consumed before [`OptionMap::finish`], so a typo fails construction
//! instead of being silently ignored.

use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Fail construction if any options were supplied.
///
/// # Errors
///
/// Returns [`Error::Configuration`] naming `backend` when `options` is `Some`,
/// including an empty string.
pub fn reject_options(backend: &str, options: Option<&str>) -> Result<()> {
    match options {
        None => Ok(()),
        Some(_) => Err(Error::configuration(backend, "accepts no options.")),
    }
}

/// Parsed `key=value` options, consumed by typed accessors.
#[derive(Debug, Clone, Default)]
pub struct OptionMap {
    backend: String,
    entries: Vec<(String, String)>,
}

impl OptionMap {
    /// Parse `options` for `backend`. `None` yields an empty map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for entries without `=` or with an empty key.
    pub fn parse(backend: &str, options: Option<&str>) -> Result<Self> {
        let mut entries: Vec<(String, String)> = Vec::new();

        for group in options.unwrap_or_default().split(';') {
            let group_start = entries.len();
            for raw in group.split(',') {
                let entry = raw.trim();
                if entry.is_empty() {
                    continue;
                }
                let Some((key, value)) = entry.split_once('=') else {
                    let continues = entries.len() > group_start;
                    match entries.last_mut() {
                        Some((_, value)) if continues => {
                            value.push(',');
                            value.push_str(raw.trim_end());
                            continue;
                        }
                        _ => {
                            return Err(Error::configuration(
                                backend,
                                format!("got malformed option '{entry}' (expected key=value)."),
                            ))
                        }
                    }
                };
                let key = key.trim();
                if key.is_empty() {
                    return Err(Error::configuration(
                        backend,
                        format!("got option '{entry}' with an empty key."),
                    ));
                }
                entries.push((key.to_ascii_lowercase(), value.trim().to_string()));
            }
        }

        Ok(Self {
            backend: backend.to_string(),
            entries,
        })
    }

    /// Returns true if no entries remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Take every value for `key`, in the order given.
    pub fn take_all(&mut self, key: &str) -> Vec<String> {
        let mut taken = Vec::new();
        self.entries.retain(|(k, v)| {
            if k == key {
                taken.push(v.clone());
                false
            } else {
                true
            }
        });
        taken
    }

    /// Take the single value for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the key is given more than once.
    pub fn take_str(&mut self, key: &str) -> Result<Option<String>> {
        let mut values = self.take_all(key);
        match values.len() {
            0 => Ok(None),
            1 => Ok(values.pop()),
            n => Err(self.error(format!("got option '{key}' {n} times."))),
        }
    }

    /// Take the single value for `key` and parse it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the value does not parse.
    pub fn take_parsed<T>(&mut self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.take_str(key)?
            .map(|value| {
                value
                    .parse()
                    .map_err(|e| self.error(format!("got invalid value for '{key}': {e}.")))
            })
            .transpose()
    }

    /// Take a boolean flag (`true/false`, `yes/no`, `on/off`, `1/0`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for any other value.
    pub fn take_bool(&mut self, key: &str) -> Result<Option<bool>> {
        self.take_str(key)?
            .map(|value| match value.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(true),
                "false" | "no" | "off" | "0" => Ok(false),
                _ => Err(self.error(format!("got invalid flag for '{key}': {value}."))),
            })
            .transpose()
    }

    /// Build a configuration error for this map's backend.
    #[must_use]
    pub fn error(&self, reason: impl Into<String>) -> Error {
        Error::configuration(&self.backend, reason)
    }

    /// Check that every option was consumed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] listing the unrecognised keys.
    pub fn finish(self) -> Result<()> {
        if self.entries.is_empty() {
            return Ok(());
        }
        let keys: BTreeSet<&str> = self.entries.iter().map(|(k, _)| k.as_str()).collect();
        let keys: Vec<&str> = keys.into_iter().collect();
        Err(self.error(format!("does not recognise option(s): {}.", keys.join(", "))))
    }
}
