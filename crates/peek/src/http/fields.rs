use axum::extract::{Query, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};

use engine::FieldInfo;

use super::error::ApiError;
use super::state::AppState;
use super::util::parse_time_range;

#[derive(Debug, Deserialize)]
pub struct FieldsQuery {
    start: Option<String>,
    end: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FieldsResponse {
    fields: Vec<FieldInfo>,
}

/// `GET /fields?start=…&end=…` (§6.1).
pub async fn fields_handler(
    State(state): State<AppState>,
    Query(params): Query<FieldsQuery>,
) -> Result<Json<FieldsResponse>, ApiError> {
    let window = parse_time_range(params.start.as_deref(), params.end.as_deref());
    let fields = state.store.get_fields(window).await?;
    Ok(Json(FieldsResponse { fields }))
}
