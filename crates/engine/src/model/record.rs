//! The normalized log entry and its companion `FieldInfo` summary type.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::field::FieldValue;
use super::level;

/// An immutable, normalized log entry.
///
/// Once returned by a parser and written to the store, a `Record` is never
/// mutated — `raw` in particular must never change after the write that
/// created it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub fields: IndexMap<String, FieldValue>,
    pub raw: String,
}

impl Record {
    pub fn new(
        id: String,
        timestamp: DateTime<Utc>,
        level: &str,
        message: String,
        fields: IndexMap<String, FieldValue>,
        raw: String,
    ) -> Self {
        Self {
            id,
            timestamp,
            level: level::normalize(level),
            message,
            fields,
            raw,
        }
    }

    /// Field resolution shared by the query evaluator: `level`/`message` are
    /// special-cased, everything else looks up `fields`.
    pub fn field_as_string(&self, name: &str) -> Option<String> {
        match name {
            "level" => Some(self.level.clone()),
            "message" => Some(self.message.clone()),
            "timestamp" => Some(self.timestamp.to_rfc3339()),
            _ => self.fields.get(name).map(FieldValue::as_display_string),
        }
    }

    pub fn field_as_f64(&self, name: &str) -> Option<f64> {
        match name {
            "level" | "message" | "timestamp" => None,
            _ => self.fields.get(name).and_then(FieldValue::as_f64),
        }
    }
}

/// A discovered field name with its most-frequent observed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub top_values: Vec<String>,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>, top_values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            type_: "string".to_string(),
            top_values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::id::IdGenerator;

    fn sample_record() -> Record {
        let gen = IdGenerator::new();
        let mut fields = IndexMap::new();
        fields.insert("service".to_string(), FieldValue::String("api".to_string()));
        fields.insert("retry".to_string(), FieldValue::Integer(3));
        Record::new(
            gen.generate(),
            Utc::now(),
            "err",
            "Connection timeout".to_string(),
            fields,
            "raw line".to_string(),
        )
    }

    #[test]
    fn level_is_normalized_on_construction() {
        let r = sample_record();
        assert_eq!(r.level, "ERROR");
    }

    #[test]
    fn json_round_trip_preserves_all_fields() {
        let r = sample_record();
        let json = serde_json::to_string(&r).unwrap();
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(r, back);
    }

    #[test]
    fn field_resolution_handles_builtins_and_user_fields() {
        let r = sample_record();
        assert_eq!(r.field_as_string("level"), Some("ERROR".to_string()));
        assert_eq!(r.field_as_string("message"), Some("Connection timeout".to_string()));
        assert_eq!(r.field_as_string("service"), Some("api".to_string()));
        assert_eq!(r.field_as_string("missing"), None);
        assert_eq!(r.field_as_f64("retry"), Some(3.0));
    }

    #[test]
    fn empty_level_round_trips_as_empty() {
        let gen = IdGenerator::new();
        let r = Record::new(
            gen.generate(),
            Utc::now(),
            "",
            "hello".to_string(),
            IndexMap::new(),
            "hello".to_string(),
        );
        assert_eq!(r.level, "");
        let json = serde_json::to_string(&r).unwrap();
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back.level, "");
    }
}
