//! Store key encoding (§3 "Store keys").
//!
//! Primary: `log:{nanos}:{id}`. Secondary (by-level): `index:level:{LEVEL}:{nanos}:{id}`.
//! Nanosecond timestamps since the Unix epoch stay at a fixed digit width for
//! centuries, so plain (unpadded) decimal formatting already sorts
//! lexicographically the same as numerically — no zero-padding needed.

use chrono::{DateTime, Utc};

pub fn nanos(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_nanos_opt().unwrap_or(i64::MAX)
}

pub fn primary_key(ts: DateTime<Utc>, id: &str) -> Vec<u8> {
    format!("log:{}:{}", nanos(ts), id).into_bytes()
}

pub fn primary_prefix() -> &'static [u8] {
    b"log:"
}

/// Lower bound key for a forward scan starting at `ts` (inclusive).
pub fn primary_seek_start(ts: DateTime<Utc>) -> Vec<u8> {
    format!("log:{}:", nanos(ts)).into_bytes()
}

/// Exclusive upper bound key: everything with a smaller nanosecond timestamp
/// than `ts + 1`.
pub fn primary_seek_end(ts: DateTime<Utc>) -> Vec<u8> {
    format!("log:{}:", nanos(ts) + 1).into_bytes()
}

pub fn by_level_key(level: &str, ts: DateTime<Utc>, id: &str) -> Vec<u8> {
    format!("index:level:{}:{}:{}", level, nanos(ts), id).into_bytes()
}

pub fn by_level_prefix(level: &str) -> Vec<u8> {
    format!("index:level:{}:", level).into_bytes()
}

/// Extracts the level component from a by-level key without touching the
/// stored record — used by `GetStats` to count per-level totals cheaply.
pub fn level_from_by_level_key(key: &[u8]) -> Option<String> {
    let s = std::str::from_utf8(key).ok()?;
    let rest = s.strip_prefix("index:level:")?;
    let end = rest.find(':')?;
    Some(rest[..end].to_string())
}

/// Parses `(nanos, id)` back out of a primary key.
pub fn parse_primary_key(key: &[u8]) -> Option<(i64, String)> {
    let s = std::str::from_utf8(key).ok()?;
    let rest = s.strip_prefix("log:")?;
    let mut parts = rest.splitn(2, ':');
    let nanos: i64 = parts.next()?.parse().ok()?;
    let id = parts.next()?.to_string();
    Some((nanos, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn keys_sort_lexicographically_by_time() {
        let a = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
        let ka = primary_key(a, "aaaaaaaaaaaaaaaa");
        let kb = primary_key(b, "bbbbbbbbbbbbbbbb");
        assert!(ka < kb);
    }

    #[test]
    fn by_level_prefix_scopes_to_one_level() {
        let ts = Utc::now();
        let key = by_level_key("ERROR", ts, "id");
        assert!(key.starts_with(&by_level_prefix("ERROR")));
        assert!(!key.starts_with(&by_level_prefix("WARN")));
    }
}
