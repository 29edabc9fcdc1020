use thiserror::Error;

/// Raised only by `ParseAs` when the caller pins a format the line doesn't
/// match. `Parse` (format auto-detection) never fails — it falls back to a
/// raw record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineParseError {
    #[error("line does not match the requested format")]
    FormatRejected,
}
