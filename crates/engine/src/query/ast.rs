//! The compiled filter tree. `Filter` is produced by [`super::parser::compile`]
//! and consumed by [`super::eval`].

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every record. What an empty query or a bare `*` compiles to.
    All,
    And(Box<Filter>, Box<Filter>),
    Or(Box<Filter>, Box<Filter>),
    Not(Box<Filter>),
    /// `field:value`. `exact` distinguishes an equality match (unquoted or
    /// quoted value) from a substring match.
    Field {
        name: String,
        value: String,
        exact: bool,
    },
    /// A bare term with no `field:` prefix — matched case-insensitively
    /// against `message` and every field value.
    Keyword(String),
    /// `field:*pattern*`, glob-style (`*` only).
    Wildcard { field: String, pattern: String },
    /// `timestamp:[start TO end]`. Either bound may be absent (unbounded).
    TimestampRange {
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    },
    /// `field:[start TO end]` for any field other than `timestamp`/`time`.
    NumericRange {
        field: String,
        start: Option<f64>,
        end: Option<f64>,
    },
}
