//! Main entry point for the auth0-export CLI

use auth0_export::cli::Cli;
use auth0_export::metrics::init_metrics;
use auth0_export::shutdown::{self, ShutdownCoordinator};
use clap::Parser;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber with optional JSON formatting
fn init_tracing(quiet: bool) {
    // Check if JSON output is requested via environment variable
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let default_level = if quiet { "auth0_export=warn" } else { "auth0_export=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    // Ctrl+C handler; the coordinator is handed to every executor explicitly
    let shutdown = ShutdownCoordinator::shared();
    shutdown::spawn_ctrl_c_listener(shutdown.clone());

    if let Some(addr) = cli.metrics_addr {
        init_metrics(addr).await?;
    }

    if let Err(e) = cli.run(shutdown).await {
        if e.is_cancelled() {
            warn!("Cancelled by user");
        } else {
            error!("Command failed: {}", e);
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
    Ok(())
}
