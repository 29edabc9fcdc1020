use chrono::{DateTime, Utc};

use crate::model::Record;

/// A single log line format: a cheap acceptance predicate plus a parser that
/// assumes acceptance already passed.
pub trait LineFormat: Send + Sync {
    /// The format's name, used for `--format` and diagnostics.
    fn name(&self) -> &'static str;

    /// Cheap structural check; does not guarantee `parse` can't still
    /// produce a degenerate record, just that the line looks like this
    /// format.
    fn accepts(&self, line: &str) -> bool;

    /// Parse a line already known (or assumed) to satisfy `accepts`.
    fn parse(&self, line: &str, id: String, ingest_now: DateTime<Utc>) -> Record;
}
