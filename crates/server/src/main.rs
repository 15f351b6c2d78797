//! Notion data service entry point.
//!
//! Loads configuration, starts the cached query service and serves the HTTP
//! API until Ctrl-C. Logs are JSON lines on stdout.

use std::sync::Arc;

use anyhow::Result;
use ndata_client::NotionClient;
use ndata_core::{AppConfig, DataService};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod error;
mod routes;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stdout)
        .json()
        .init();

    let config = AppConfig::load()?;

    tracing::info!("Starting up Notion data API service");

    let client = NotionClient::from_app_config(&config)?;
    let service = Arc::new(DataService::from_config(Arc::new(client), &config));

    tracing::info!(
        poll_interval = ?service.poll_interval(),
        known_databases = config.known_databases.len(),
        bind = %config.bind_addr(),
        "Polling Notion for cached databases"
    );

    service.start().await;

    let listener = TcpListener::bind(config.bind_addr()).await?;
    axum::serve(listener, routes::router(service.clone()))
        .with_graceful_shutdown(shutdown_signal(service))
        .await?;

    tracing::info!("Shutting down Notion data API service");

    Ok(())
}

/// Resolve on Ctrl-C after stopping the background loops.
async fn shutdown_signal(service: Arc<DataService>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    service.stop().await;
}
