//! Structured-object (brace-delimited / JSON-like) parser (§4.1).

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::model::{FieldValue, Record};
use crate::parser::extract;
use crate::parser::traits::LineFormat;

pub struct StructuredFormat;

impl LineFormat for StructuredFormat {
    fn name(&self) -> &'static str {
        "json"
    }

    fn accepts(&self, line: &str) -> bool {
        match serde_json::from_str::<serde_json::Value>(line.trim()) {
            Ok(serde_json::Value::Object(_)) => true,
            _ => false,
        }
    }

    fn parse(&self, line: &str, id: String, ingest_now: DateTime<Utc>) -> Record {
        let mut fields: IndexMap<String, FieldValue> = IndexMap::new();
        if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(line.trim()) {
            for (k, v) in map {
                fields.insert(k, FieldValue::from_json(v));
            }
        }
        let extracted = extract::extract(&mut fields, ingest_now);
        Record::new(
            id,
            extracted.timestamp,
            &extracted.level,
            extracted.message,
            fields,
            line.to_string(),
        )
    }
}
