//! Urban API Server
//!
//! Land-cover and urban growth insight for a user-drawn bounding box.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use urban_api::config::ServiceConfig;
use urban_api::state::AppState;

/// Urban API Server
#[derive(Parser, Debug)]
#[command(name = "urban-api")]
#[command(about = "Land-cover and urban growth insight server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8000", env = "URBAN_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config/urban-api.yaml", env = "URBAN_CONFIG")]
    config: PathBuf,

    /// Number of worker threads
    #[arg(long, env = "URBAN_WORKER_THREADS")]
    worker_threads: Option<usize>,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build runtime with configured threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;
    runtime.block_on(run_server(args))
}

async fn run_server(args: Args) -> Result<()> {
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    // Initialize Prometheus metrics exporter
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    urban_api::metrics::describe();

    info!("Starting urban API server");

    let mut config = ServiceConfig::load(&args.config)?;
    config.apply_env_overrides()?;

    if config.earth_engine.access_token.is_none() {
        tracing::warn!("EE_ACCESS_TOKEN is not set; Earth Engine requests will be unauthenticated");
    }

    tokio::fs::create_dir_all(config.export_dir())
        .await
        .with_context(|| format!("Failed to create {}", config.export_dir().display()))?;

    let state = Arc::new(AppState::from_config(config)?);
    let app = urban_api::build_router(state, prometheus_handle);

    // Parse listen address
    let addr: SocketAddr = args.listen.parse().context("Invalid listen address")?;

    info!("Urban API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind")?;
    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}
