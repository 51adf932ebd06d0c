//! HTTP server bootstrap

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use shared::error::{AppError, AppResult};

use super::config::Config;
use super::state::ServerState;
use crate::api;

pub async fn run(config: Config) -> AppResult<()> {
    let addr = config.bind_addr();
    let state = ServerState::initialize(config)?;

    let app = api::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(%addr, "Order server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}
