//! tapp-import - normalize, diff and export TAPP import files

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tapp_common::config::{load_config, LoggingConfig};
use tapp_import::cli::{run, Cli};
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Tracing is not up yet; load errors surface through anyhow
    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.logging)?;

    debug!(
        "Starting tapp-import v{} (threshold {}, wage chunk boundary {})",
        env!("CARGO_PKG_VERSION"),
        config.import.similarity_threshold,
        config.import.wage_chunk_boundary
    );

    run(&cli, &config).map_err(|e| {
        error!("{:#}", e);
        e
    })
}
