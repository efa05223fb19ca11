use std::sync::Arc;

use anyhow::Result;
use edukit_manager_api::{app, config, middleware};
use persistence::MemoryStore;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load()?;

    middleware::logging::init_logging(&config.logging)?;
    middleware::init_metrics()?;

    info!("Starting Edukit Manager API v{}", env!("CARGO_PKG_VERSION"));

    let addr = config.socket_addr()?;
    let state = app::AppState::connect(config, Arc::new(MemoryStore::new())).await?;
    let locations = state.locations.clone();
    let app = app::create_app(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let background location writes finish before exiting.
    if let Some(store) = locations {
        store.lock().await.flush().await;
    }
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
