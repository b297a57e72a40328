//! Host configuration.

use crate::info::{InfoRenderer, RenderCapability};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a [`VerifierHost`](crate::host::VerifierHost).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Registry name of the backend to run.
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Backend options string. Absent means "no options".
    #[serde(default)]
    pub options: Option<String>,

    /// Upper bound on a single verification, in seconds.
    #[serde(default = "default_verify_timeout")]
    pub verify_timeout_secs: u64,

    /// Directory holding the info page template.
    #[serde(default = "default_template_dir")]
    pub template_dir: PathBuf,

    /// Render the info template instead of serving it raw.
    #[serde(default = "default_templating")]
    pub templating: bool,

    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            options: None,
            verify_timeout_secs: default_verify_timeout(),
            template_dir: default_template_dir(),
            templating: default_templating(),
            log_level: default_log_level(),
        }
    }
}

fn default_backend() -> String {
    "base".to_string()
}

const fn default_verify_timeout() -> u64 {
    30
}

fn default_template_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "notary-backend")
        .map(|dirs| dirs.data_dir().join("templates"))
        .filter(|dir| dir.is_dir())
        .unwrap_or_else(|| PathBuf::from("templates"))
}

const fn default_templating() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl HostConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn to_file(&self, path: &std::path::Path) -> crate::Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Host timeout for one verification.
    #[must_use]
    pub fn verify_timeout(&self) -> Duration {
        Duration::from_secs(self.verify_timeout_secs)
    }

    /// Info renderer for the configured template directory.
    #[must_use]
    pub fn renderer(&self) -> InfoRenderer {
        let capability = if self.templating {
            RenderCapability::slot_templates()
        } else {
            RenderCapability::StaticOnly
        };
        InfoRenderer::in_dir(&self.template_dir, capability)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::info::INFO_TEMPLATE_NAME;

    #[test]
    fn defaults_fill_missing_fields() {
        let config: HostConfig = toml::from_str("backend = \"pinned\"").expect("parse");
        assert_eq!(config.backend, "pinned");
        assert_eq!(config.options, None);
        assert_eq!(config.verify_timeout(), Duration::from_secs(30));
        assert!(config.templating);
    }

    #[test]
    fn round_trips_through_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("notary.toml");
        let config = HostConfig {
            backend: "peer".to_string(),
            options: Some("url=https://notary.example.org".to_string()),
            verify_timeout_secs: 5,
            template_dir: dir.path().to_path_buf(),
            templating: false,
            log_level: "debug".to_string(),
        };
        config.to_file(&path).expect("write");
        assert_eq!(HostConfig::from_file(&path).expect("read"), config);
    }

    #[test]
    fn invalid_file_is_config_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "verify_timeout_secs = \"soon\"").expect("write");
        assert!(matches!(
            HostConfig::from_file(&path),
            Err(crate::Error::Config(_))
        ));
    }

    #[test]
    fn renderer_points_at_template() {
        let config = HostConfig {
            template_dir: PathBuf::from("/srv/notary"),
            ..HostConfig::default()
        };
        assert_eq!(
            config.renderer().template_path(),
            PathBuf::from("/srv/notary").join(INFO_TEMPLATE_NAME)
        );
    }
}
