use axum::extract::State;
use axum::response::Json;
use serde_json::{json, Value};

use super::error::ApiError;
use super::state::AppState;

/// `GET /health` (§6.1).
pub async fn health_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let stats = state.store.get_stats().await?;
    Ok(Json(json!({
        "status": "ok",
        "logs_stored": stats.total_logs,
        "db_size_bytes": (stats.db_size_mb * 1_000_000.0) as u64,
    })))
}
