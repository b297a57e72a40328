//! Command-line interface definition.

use clap::{Parser, Subcommand};
use notary_backend::HostConfig;
use std::path::PathBuf;

/// Run a notary verification backend against a single request.
#[derive(Parser, Debug)]
#[command(name = "notary-backend")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file.
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Registry name of the backend to use.
    #[arg(long, short, env = "NOTARY_BACKEND")]
    pub backend: Option<String>,

    /// Backend options string.
    #[arg(long, short, env = "NOTARY_BACKEND_OPTIONS")]
    pub options: Option<String>,

    /// Upper bound on a verification, in seconds.
    #[arg(long, env = "NOTARY_VERIFY_TIMEOUT")]
    pub timeout_secs: Option<u64>,

    /// Directory holding InfoNode.html.
    #[arg(long, env = "NOTARY_TEMPLATE_DIR")]
    pub template_dir: Option<PathBuf>,

    /// Serve the info template raw instead of rendering it.
    #[arg(long)]
    pub no_templating: bool,

    /// Log level.
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub log_json: bool,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Verify a fingerprint for a target and print the result as JSON.
    Verify {
        /// Target host name.
        host: String,
        /// Target port.
        port: u16,
        /// Fingerprint to check.
        fingerprint: String,
        /// Resolved address to use instead of the host name.
        #[arg(long)]
        address: Option<String>,
    },

    /// Print the backend's info page.
    Info {
        /// Request path passed to the renderer.
        #[arg(long, default_value = "/")]
        path: String,
    },

    /// List registered backends and their options.
    Backends,
}

impl Cli {
    /// Build the host configuration from file and flags.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file is specified but cannot be loaded.
    pub fn to_config(&self) -> color_eyre::Result<HostConfig> {
        let mut config = if let Some(ref path) = self.config {
            HostConfig::from_file(path)?
        } else {
            HostConfig::default()
        };

        if let Some(ref backend) = self.backend {
            config.backend.clone_from(backend);
        }
        if self.options.is_some() {
            config.options.clone_from(&self.options);
        }
        if let Some(secs) = self.timeout_secs {
            config.verify_timeout_secs = secs;
        }
        if let Some(ref dir) = self.template_dir {
            config.template_dir.clone_from(dir);
        }
        if self.no_templating {
            config.templating = false;
        }
        config.log_level.clone_from(&self.log_level);

        Ok(config)
    }
}
