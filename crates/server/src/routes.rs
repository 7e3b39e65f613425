use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use mockbird_engine::{Registry, Result};

use crate::{handlers, passthrough, settings};

/// Assembles the full route table over a shared registry.
#[must_use]
pub fn router(registry: Arc<Registry>) -> Router {
    Router::new()
        .route("/mock", post(handlers::create_mock))
        .route("/mock/:endpoint", post(handlers::register_mock))
        .route("/mock/:endpoint/*path", post(handlers::register_mock_with_path))
        .route("/endpoint/:endpoint", get(handlers::play_endpoint))
        .route("/endpoint/:endpoint/*path", get(handlers::play_endpoint_with_path))
        .route("/settings/:endpoint", get(settings::configure).post(settings::configure))
        .route("/response/:status", get(passthrough::echo_status))
        .route("/response/:status/*path", get(passthrough::echo_status_with_path))
        .route("/timeout/:spec", get(passthrough::timeout))
        .route("/timeout/:spec/*path", get(passthrough::timeout_with_path))
        .with_state(registry)
}

/// Binds the listener and serves requests until the process exits.
pub async fn serve(registry: Arc<Registry>, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("mockbird listening on {}", listener.local_addr()?);
    axum::serve(listener, router(registry)).await?;
    Ok(())
}
