use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use fls_dashboard::{Config, FileStore};
use tokio::signal;
use tracing_subscriber::EnvFilter;

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_STORAGE_PATH: &str = ".fls-dashboard/storage.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env().context("loading configuration")?;
    let listen_addr: SocketAddr = std::env::var("FLS_LISTEN_ADDR")
        .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_owned())
        .parse()
        .context("FLS_LISTEN_ADDR")?;
    let storage_path =
        std::env::var("FLS_STORAGE_PATH").unwrap_or_else(|_| DEFAULT_STORAGE_PATH.to_owned());

    let storage = FileStore::open(&storage_path)
        .with_context(|| format!("opening storage at {storage_path}"))?;

    tracing::info!(
        %listen_addr,
        storage = %storage_path,
        backend = %config.api_base(),
        speckle = %config.speckle_server(),
        "Starting FLS dashboard"
    );

    let app = fls_dashboard::web::router(config, Arc::new(storage));
    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("binding {listen_addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving dashboard")?;

    tracing::info!("Dashboard stopped");
    Ok(())
}

fn init_tracing() {
    // RUST_LOG takes precedence
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("fls_dashboard=info,tower_http=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
