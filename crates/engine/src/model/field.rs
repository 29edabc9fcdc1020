//! `FieldValue` — the tagged variant backing `Record::fields`.
//!
//! Design note §9 calls out the `fields` map's polymorphism explicitly: it
//! may hold strings, numbers, booleans, arrays, or nested objects. Rather
//! than carrying `serde_json::Value` around (which would let the rest of the
//! crate treat fields as untyped JSON everywhere), this is a closed enum so
//! query evaluation and storage code pattern-match on a known shape.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Array(Vec<FieldValue>),
    Object(IndexMap<String, FieldValue>),
}

impl FieldValue {
    /// A display-friendly string representation, used for keyword/field
    /// matching and for `GetFields`' top-values enumeration.
    pub fn as_display_string(&self) -> String {
        match self {
            FieldValue::String(s) => s.clone(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Array(items) => {
                let parts: Vec<String> = items.iter().map(FieldValue::as_display_string).collect();
                format!("[{}]", parts.join(","))
            }
            FieldValue::Object(map) => {
                serde_json::to_string(map).unwrap_or_default()
            }
        }
    }

    /// Numeric interpretation used by `NumericRange` filters: integers,
    /// floats, and numeric strings all compare; anything else is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            FieldValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => FieldValue::String(s),
            serde_json::Value::Bool(b) => FieldValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FieldValue::Integer(i)
                } else {
                    FieldValue::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::Array(items) => {
                FieldValue::Array(items.into_iter().map(FieldValue::from_json).collect())
            }
            serde_json::Value::Object(map) => {
                let mut out = IndexMap::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(k, FieldValue::from_json(v));
                }
                FieldValue::Object(out)
            }
            serde_json::Value::Null => FieldValue::String(String::new()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}
