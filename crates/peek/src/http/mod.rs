//! HTTP + WebSocket surface (§6.1/§6.2): a thin adapter over `engine`, router
//! assembly and graceful shutdown grounded on the teacher's `main.rs`.

mod error;
mod fields;
mod health;
mod query;
mod state;
mod stats;
mod util;
mod ws;

pub use state::AppState;

use std::time::Duration;

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::warn;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST]);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/stats", get(stats::stats_handler))
        .route("/fields", get(fields::fields_handler))
        .route("/query", post(query::query_handler))
        .route("/logs", get(ws::logs_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
                .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES))
                .layer(cors),
        )
        .with_state(state)
}

/// Graceful shutdown on SIGINT/SIGTERM (§6.1/§7 `ShutdownSignal`).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => warn!("received Ctrl+C, shutting down"),
        _ = terminate => warn!("received SIGTERM, shutting down"),
    }
}
