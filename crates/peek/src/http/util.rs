use chrono::{DateTime, Utc};
use engine::Filter;
use engine::query::range;

/// ANDs the fresh-mode cutoff (if any) into a user-supplied filter (§4.5).
pub fn with_fresh_mode(filter: Filter, cutoff: Option<DateTime<Utc>>) -> Filter {
    match cutoff {
        Some(c) => Filter::And(
            Box::new(filter),
            Box::new(Filter::TimestampRange { start: Some(c), end: None }),
        ),
        None => filter,
    }
}

/// Parses the optional `start`/`end` RFC3339 query/body params into a
/// `(start, end)` time-range tuple, using the same bound grammar as
/// `timestamp:[..]` query ranges.
pub fn parse_time_range(start: Option<&str>, end: Option<&str>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = start.and_then(range::parse_bound);
    let end = end.and_then(range::parse_bound);
    match (start, end) {
        (None, None) => None,
        (s, e) => Some((s.unwrap_or(DateTime::<Utc>::MIN_UTC), e.unwrap_or(Utc::now()))),
    }
}
