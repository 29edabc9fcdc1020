use std::time::Instant;

use axum::extract::State;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use engine::Record;

use super::error::ApiError;
use super::state::AppState;
use super::util::{parse_time_range, with_fresh_mode};

/// Default page size for both `/query` and the `/logs` subscribe snapshot.
pub const DEFAULT_LIMIT: usize = 100;

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub logs: Vec<Record>,
    pub total: usize,
    pub took_ms: u64,
}

/// `POST /query` (§6.1): compiles the query, ANDs in the fresh-mode cutoff if
/// any, and times the store round-trip for `took_ms`.
pub async fn query_handler(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let started = Instant::now();
    let filter = engine::compile(&req.query)?;
    let filter = with_fresh_mode(filter, state.fresh_cutoff);
    let time_range = parse_time_range(req.start.as_deref(), req.end.as_deref());
    let (logs, total) = state.store.query(filter, time_range, req.limit, req.offset).await?;
    Ok(Json(QueryResponse {
        logs,
        total,
        took_ms: started.elapsed().as_millis() as u64,
    }))
}
