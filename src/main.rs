mod cli;
mod commands;
mod config;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use graph_link::{BoltProvider, Connector};
use telemetry::TracingObserver;
use tracing::{debug, error};

use crate::cli::Cli;
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_env(|key| std::env::var(key).ok());
    config.apply_overrides(cli.uri.clone(), cli.database.clone());

    if let Err(e) = telemetry::init_tracing(&config.logging.filter) {
        eprintln!("Failed to initialize logging: {}", e);
    }
    debug!(?config, "Loaded configuration");

    let connector = Connector::new(
        Arc::new(BoltProvider::with_fetch_size(config.connection.fetch_size)),
        Arc::new(TracingObserver),
    );

    if let Err(e) = commands::execute(cli.command, &config, &connector, cli.json).await {
        error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}
