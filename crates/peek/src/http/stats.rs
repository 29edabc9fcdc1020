use axum::extract::State;
use axum::response::Json;
use engine::Stats;

use super::error::ApiError;
use super::state::AppState;

/// `GET /stats` (§6.1).
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<Stats>, ApiError> {
    Ok(Json(state.store.get_stats().await?))
}
