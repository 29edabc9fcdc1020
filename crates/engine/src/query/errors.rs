use thiserror::Error;

/// A structurally malformed query string. Carries the byte offset the
/// compiler was at when it gave up, so HTTP handlers can surface a useful
/// `400`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("query parse error at position {position}: {message}")]
pub struct QueryParseError {
    pub position: usize,
    pub message: String,
}

impl QueryParseError {
    pub fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}
