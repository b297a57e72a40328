//! notary-backend CLI entry point.

mod cli;

use clap::Parser;
use cli::{Cli, Command};
use notary_backend::{BackendRegistry, RequestContext, VerificationRequest, VerifierHost};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.log_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    info!("notary-backend v{}", env!("CARGO_PKG_VERSION"));

    let registry = BackendRegistry::builtin();

    if let Command::Backends = cli.command {
        for factory in registry.factories() {
            println!("{}", factory.name);
            if let Some(options) = factory.options_description {
                for line in options.lines() {
                    println!("    {line}");
                }
            }
        }
        return Ok(());
    }

    let config = cli.to_config()?;
    let host = VerifierHost::new(&config, registry)?;

    match cli.command {
        Command::Verify {
            host: target_host,
            port,
            fingerprint,
            address,
        } => {
            let mut request = VerificationRequest::new(target_host, port, fingerprint);
            request.address = address;
            let result = host.verify(&request).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Info { path } => {
            println!("{}", host.info(&RequestContext::new(path)));
        }
        Command::Backends => {}
    }

    Ok(())
}
