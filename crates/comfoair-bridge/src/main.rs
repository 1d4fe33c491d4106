//! ComfoAir bridge binary.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use comfoair_bridge::bridge;
use comfoair_bridge::config::Config;
use comfoair_bridge::types::TracingPublisher;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "comfoair-bridge")]
#[command(about = "Republish a ComfoAir ventilation unit's state", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "comfoair.toml")]
    config: PathBuf,

    /// Log every serial transaction
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let config = Config::load(&cli.config)?;
    info!(
        port = %config.serial.port,
        prefix = %config.bridge.topic_prefix,
        "Starting comfoair-bridge"
    );

    bridge::run(config, Arc::new(TracingPublisher)).await
}
