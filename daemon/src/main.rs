//! vouch daemon — entry point for running the reputation engine.

mod config;
mod logging;
mod service;
mod shutdown;

use clap::Parser;
use std::path::PathBuf;

use config::VouchConfig;
use logging::LogFormat;
use service::VouchService;

#[derive(Parser)]
#[command(name = "vouch-daemon", about = "vouch reputation engine daemon")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ethereum JSON-RPC endpoint.
    #[arg(long, env = "VOUCH_RPC_ENDPOINT")]
    rpc_endpoint: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "VOUCH_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "VOUCH_LOG_FORMAT")]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = if let Some(ref config_path) = cli.config {
        match VouchConfig::from_toml_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!(
                    "failed to load config file {}: {e}, using defaults",
                    config_path.display()
                );
                VouchConfig::default()
            }
        }
    } else {
        VouchConfig::default()
    };

    if let Some(rpc_endpoint) = cli.rpc_endpoint {
        config.rpc_endpoint = rpc_endpoint;
    }
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level;
    }
    if let Some(log_format) = cli.log_format {
        config.log_format = log_format;
    }

    logging::init_logging(LogFormat::from_config(&config.log_format), &config.log_level);

    let set = config.collection_set()?;
    tracing::info!(
        rpc = %config.rpc_endpoint,
        collections = set.len(),
        max_weight = set.max_weight(),
        "starting vouch daemon"
    );

    let mut service = VouchService::new(&config)?;
    service.start();

    service.shutdown_controller().wait_for_signal().await;

    tracing::info!("shutdown signal received — stopping service");
    service.stop().await;
    tracing::info!("vouch daemon exited cleanly");

    Ok(())
}
