//! Field-extraction rules shared by every concrete parser (§4.1): pull
//! timestamp/level/message out of the raw field map, normalize level, and
//! leave everything else in `fields`.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::model::{level, FieldValue};

/// Extracted (timestamp, level, message); `fields` is mutated in place to
/// remove the keys that were consumed.
pub struct Extracted {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub message: String,
}

pub fn extract(fields: &mut IndexMap<String, FieldValue>, ingest_now: DateTime<Utc>) -> Extracted {
    let timestamp = take_first(fields, &["timestamp", "time"])
        .and_then(|v| parse_timestamp(&v.as_display_string()))
        .unwrap_or(ingest_now);

    let level_raw = take_first(fields, &["level", "severity"])
        .map(|v| v.as_display_string())
        .unwrap_or_default();

    let message = take_first(fields, &["message", "msg"])
        .map(|v| v.as_display_string())
        .unwrap_or_default();

    Extracted {
        timestamp,
        level: level::normalize(&level_raw),
        message,
    }
}

fn take_first(fields: &mut IndexMap<String, FieldValue>, keys: &[&str]) -> Option<FieldValue> {
    for key in keys {
        if let Some(v) = fields.shift_remove(*key) {
            return Some(v);
        }
    }
    None
}

/// RFC3339, with or without fractional seconds. Anything else is not a valid
/// timestamp field and the caller falls back to the ingest wall clock.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_timestamp_level_and_message() {
        let mut fields = IndexMap::new();
        fields.insert("time".to_string(), FieldValue::String("2026-02-18T10:30:45Z".to_string()));
        fields.insert("level".to_string(), FieldValue::String("ERR".to_string()));
        fields.insert("msg".to_string(), FieldValue::String("Connection timeout".to_string()));
        fields.insert("service".to_string(), FieldValue::String("api".to_string()));

        let now = Utc::now();
        let extracted = extract(&mut fields, now);

        assert_eq!(extracted.level, "ERROR");
        assert_eq!(extracted.message, "Connection timeout");
        assert_eq!(extracted.timestamp.to_rfc3339(), "2026-02-18T10:30:45+00:00");
        assert_eq!(fields.len(), 1);
        assert!(fields.contains_key("service"));
    }

    #[test]
    fn missing_timestamp_falls_back_to_ingest_clock() {
        let mut fields = IndexMap::new();
        let now = Utc::now();
        let extracted = extract(&mut fields, now);
        assert_eq!(extracted.timestamp, now);
        assert_eq!(extracted.level, "");
        assert_eq!(extracted.message, "");
    }

    #[test]
    fn invalid_timestamp_falls_back_to_ingest_clock() {
        let mut fields = IndexMap::new();
        fields.insert("timestamp".to_string(), FieldValue::String("not-a-time".to_string()));
        let now = Utc::now();
        let extracted = extract(&mut fields, now);
        assert_eq!(extracted.timestamp, now);
    }
}
