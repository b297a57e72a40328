//! Certificate fingerprint tool for building pin lists.
//!
//! Prints one line per certificate found in each file, PEM or DER:
//!
//! ```text
//! <path>[#<index>]  AB:CD:...
//! ```
//!
//! Usage:
//!   cargo run --bin notary-fingerprint <cert-file>...

use clap::Parser;
use color_eyre::eyre::{bail, WrapErr};
use notary_backend::fingerprint::{certificates_from_bytes, sha256_fingerprint};
use std::fs;
use std::path::PathBuf;

/// Print SHA-256 fingerprints of certificate files.
#[derive(Parser, Debug)]
#[command(name = "notary-fingerprint", version, about)]
struct Args {
    /// Certificate files (PEM or DER).
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    for path in &args.files {
        let data = fs::read(path).wrap_err_with(|| format!("reading {}", path.display()))?;
        let certs = certificates_from_bytes(&data)
            .wrap_err_with(|| format!("parsing {}", path.display()))?;
        if certs.is_empty() {
            bail!("no certificates in {}", path.display());
        }

        for (i, der) in certs.iter().enumerate() {
            let label = if certs.len() == 1 {
                path.display().to_string()
            } else {
                format!("{}#{i}", path.display())
            };
            println!("{label}  {}", sha256_fingerprint(der));
        }
    }

    Ok(())
}
