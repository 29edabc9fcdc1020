//! Range-bound parsing shared by `timestamp:[..]` query ranges and the
//! `/query` endpoint's `start`/`end` params (§4.3 "Range bound parsing").
//!
//! An empty or unrecognized bound means "unbounded on that side", not an
//! error — a malformed bound should narrow the search as little as possible.

use chrono::{DateTime, Duration, TimeZone, Utc};

/// Parses one range bound. `None` means unbounded.
pub fn parse_bound(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if s == "now" {
        return Some(Utc::now());
    }
    if let Some(rest) = s.strip_prefix("now-") {
        if let Some(dur) = parse_relative_duration(rest) {
            return Some(Utc::now() - dur);
        }
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // RFC3339-shaped but with no offset: assume UTC.
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    // Bare date, no time component: midnight UTC.
    if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    // All-digit values above 10^12 are epoch milliseconds.
    if let Ok(n) = s.parse::<i64>() {
        if n > 1_000_000_000_000 {
            return Utc.timestamp_millis_opt(n).single();
        }
    }
    None
}

fn parse_relative_duration(spec: &str) -> Option<Duration> {
    if spec.is_empty() {
        return None;
    }
    let (num_part, unit) = spec.split_at(spec.len() - 1);
    let n: i64 = num_part.parse().ok()?;
    match unit {
        "h" => Some(Duration::hours(n)),
        "m" => Some(Duration::minutes(n)),
        "d" => Some(Duration::hours(n * 24)),
        "w" => Some(Duration::hours(n * 24 * 7)),
        _ => None,
    }
}

/// Plain numeric bound for `field:[a TO b]` ranges over non-timestamp
/// fields. Empty or unparsable means unbounded.
pub fn parse_numeric_bound(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bound_is_unbounded() {
        assert_eq!(parse_bound(""), None);
    }

    #[test]
    fn now_parses_to_current_time() {
        let before = Utc::now();
        let got = parse_bound("now").unwrap();
        let after = Utc::now();
        assert!(got >= before && got <= after);
    }

    #[test]
    fn relative_hours_subtracts_from_now() {
        let got = parse_bound("now-1h").unwrap();
        let expected = Utc::now() - Duration::hours(1);
        assert!((got - expected).num_seconds().abs() < 5);
    }

    #[test]
    fn rfc3339_without_offset_is_treated_as_utc() {
        let got = parse_bound("2026-02-18T10:30:00").or_else(|| parse_bound("2026-02-18T10:30:00Z"));
        assert!(got.is_some());
    }

    #[test]
    fn bare_date_is_midnight_utc() {
        let got = parse_bound("2026-02-18").unwrap();
        assert_eq!(got.format("%H:%M:%S").to_string(), "00:00:00");
    }

    #[test]
    fn large_integer_is_epoch_millis() {
        let got = parse_bound("1771400000000").unwrap();
        assert_eq!(got.timestamp_millis(), 1_771_400_000_000);
    }

    #[test]
    fn small_integer_is_not_epoch_millis() {
        assert_eq!(parse_bound("299"), None);
    }

    #[test]
    fn numeric_bound_parses_floats() {
        assert_eq!(parse_numeric_bound("3.5"), Some(3.5));
        assert_eq!(parse_numeric_bound(""), None);
        assert_eq!(parse_numeric_bound("nope"), None);
    }
}
