use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use engine::{QueryParseError, StoreError};
use serde_json::json;
use thiserror::Error;

/// Maps the two caller-facing error kinds from §7 onto HTTP status codes:
/// a bad query is the client's fault, a store failure is ours.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid query: {0}")]
    Query(#[from] QueryParseError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Query(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Store(e) => {
                tracing::error!(error = %e, "store error handling request");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
