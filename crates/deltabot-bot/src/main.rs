//! deltabot - Entry Point
//!
//! Observation mode: signals and ledger only
//! Trading mode: signed market orders on actionable signals

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Signal-driven trader for the Delta Exchange
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via DELTABOT_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    deltabot_telemetry::init_logging()?;

    info!("Starting deltabot v{}", env!("CARGO_PKG_VERSION"));

    // CLI arg > DELTABOT_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("DELTABOT_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = deltabot_bot::AppConfig::from_file(&config_path)?;

    let app = deltabot_bot::Application::build(config).await?;
    app.run().await?;

    Ok(())
}
