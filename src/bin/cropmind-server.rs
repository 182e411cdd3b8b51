//! # CropMind Server
//!
//! Loads configuration, builds the application state and serves the HTTP API
//! until Ctrl-C.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

use cropmind_core::config::ConfigManager;
use cropmind_core::logging::init_structured_logging;
use cropmind_core::web::{create_router, AppState};

#[derive(Parser)]
#[command(name = "cropmind-server")]
#[command(about = "Serve the CropMind crop lifecycle API")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration directory (default: ./config)
    #[arg(short, long, env = "CROPMIND_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Environment section to apply (development, test, production)
    #[arg(short, long, env = "CROPMIND_ENV")]
    environment: Option<String>,

    /// Override `server.bind_address`
    #[arg(short, long)]
    bind: Option<String>,

    /// Print the sanitized effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_structured_logging();

    if let Err(e) = run(cli).await {
        error!(error = %e, "cropmind-server failed");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let manager = match &cli.environment {
        Some(environment) => {
            ConfigManager::load_from_directory_with_env(cli.config_dir.clone(), environment)?
        }
        None => ConfigManager::load_from_directory(cli.config_dir.clone())?,
    };

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&manager.debug_config())?);
        return Ok(());
    }

    let mut config = manager.config().clone();
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }
    let bind_address = config.server.bind_address.clone();

    let state = AppState::from_config(config).await?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(
        bind_address = %bind_address,
        environment = %manager.environment(),
        "🌾 CropMind API listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
