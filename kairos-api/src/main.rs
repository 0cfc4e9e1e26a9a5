//! kairos-api - Room analysis service
//!
//! Accepts a room photo and a vibe description and returns decorating
//! suggestions, either from the built-in rule table or with help from an
//! external multimodal model and shopping search.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use kairos_api::config::{CliOverrides, PipelineMode, ServiceConfig};
use kairos_api::{build_router, AppState};
use kairos_common::config::{default_config_path, load_toml_config};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "kairos_api=debug,tower_http=debug";

/// Command-line arguments for kairos-api
#[derive(Parser, Debug)]
#[command(name = "kairos-api")]
#[command(about = "Room analysis and decorating suggestion service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "KAIROS_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "KAIROS_HOST")]
    host: Option<String>,

    /// Pipeline serving /analyze-room (rules or assisted)
    #[arg(long, env = "KAIROS_PIPELINE")]
    pipeline: Option<PipelineMode>,

    /// Path to the TOML config file
    #[arg(short, long, env = "KAIROS_CONFIG")]
    config: Option<PathBuf>,

    /// Directory that receives uploaded photos
    #[arg(long, env = "KAIROS_UPLOAD_DIR")]
    upload_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .or_else(|| default_config_path("kairos-api"))
        .unwrap_or_else(|| PathBuf::from("kairos-api.toml"));
    let toml_config = load_toml_config(&config_path)?;

    // Initialize tracing
    let default_filter = toml_config
        .logging
        .filter
        .clone()
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting kairos-api v{}", env!("CARGO_PKG_VERSION"));
    info!("Config file: {}", config_path.display());

    let cli = CliOverrides {
        host: args.host,
        port: args.port,
        pipeline: args.pipeline,
        upload_dir: args.upload_dir,
    };
    let config = ServiceConfig::resolve(cli, &toml_config).context("Invalid configuration")?;
    config.log_missing_credentials();

    info!("Pipeline: {}", config.pipeline);
    info!("Upload directory: {}", config.upload_dir.display());

    let bind_host = config.host.clone();
    let bind_port = config.port;

    let state = AppState::new(config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((bind_host.as_str(), bind_port))
        .await
        .with_context(|| format!("Failed to bind to {}:{}", bind_host, bind_port))?;
    let addr = listener.local_addr().context("Failed to read bound address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
