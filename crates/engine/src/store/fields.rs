//! `GetFields` (§4.2): one forward scan building `name -> value -> count`,
//! capped at [`MAX_DISTINCT_VALUES_PER_FIELD`] distinct values tracked per
//! field. `message` is excluded from value enumeration (too high
//! cardinality) but still always appears in the result.

use indexmap::IndexMap;

use crate::model::{FieldInfo, Record};

/// Resolves Open Question #2 in §9: the per-field distinct-value tracking
/// budget is not specified numerically: this crate fixes it at 1000.
pub const MAX_DISTINCT_VALUES_PER_FIELD: usize = 1000;

const TOP_VALUES_LIMIT: usize = 10;

const BUILTIN_NAMES: [&str; 3] = ["level", "message", "timestamp"];

pub fn build_field_info<I: Iterator<Item = Record>>(records: I) -> Vec<FieldInfo> {
    let mut counts: IndexMap<String, IndexMap<String, u64>> = IndexMap::new();
    for name in BUILTIN_NAMES {
        counts.insert(name.to_string(), IndexMap::new());
    }

    for record in records {
        bump(&mut counts, "level", &record.level);
        // message is intentionally never enumerated.
        bump(&mut counts, "timestamp", &record.timestamp.to_rfc3339());
        for (name, value) in record.fields.iter() {
            bump(&mut counts, name, &value.as_display_string());
        }
    }

    counts
        .into_iter()
        .map(|(name, values)| {
            if name == "message" {
                return FieldInfo::new(name, Vec::new());
            }
            let mut ranked: Vec<(String, u64)> = values.into_iter().collect();
            ranked.sort_by(|a, b| b.1.cmp(&a.1));
            ranked.truncate(TOP_VALUES_LIMIT);
            FieldInfo::new(name, ranked.into_iter().map(|(v, _)| v).collect())
        })
        .collect()
}

fn bump(counts: &mut IndexMap<String, IndexMap<String, u64>>, name: &str, value: &str) {
    let entry = counts.entry(name.to_string()).or_default();
    if let Some(count) = entry.get_mut(value) {
        *count += 1;
    } else if entry.len() < MAX_DISTINCT_VALUES_PER_FIELD {
        entry.insert(value.to_string(), 1);
    }
    // Beyond the cap, further distinct values for this field are silently
    // dropped from enumeration; already-tracked values keep accumulating.
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::model::{FieldValue, IdGenerator};

    use super::*;

    fn record(level: &str, fields: &[(&str, &str)]) -> Record {
        let mut m = IndexMap::new();
        for (k, v) in fields {
            m.insert(k.to_string(), FieldValue::String(v.to_string()));
        }
        Record::new(IdGenerator::new().generate(), Utc::now(), level, "hi".into(), m, "hi".into())
    }

    #[test]
    fn builtins_always_present_even_with_no_records() {
        let info = build_field_info(std::iter::empty());
        let names: Vec<_> = info.iter().map(|f| f.name.clone()).collect();
        assert!(names.contains(&"level".to_string()));
        assert!(names.contains(&"message".to_string()));
        assert!(names.contains(&"timestamp".to_string()));
    }

    #[test]
    fn message_is_never_enumerated() {
        let info = build_field_info(vec![record("INFO", &[])].into_iter());
        let message_field = info.iter().find(|f| f.name == "message").unwrap();
        assert!(message_field.top_values.is_empty());
    }

    #[test]
    fn top_values_ranked_by_descending_count() {
        let records = vec![
            record("INFO", &[("service", "api")]),
            record("INFO", &[("service", "api")]),
            record("INFO", &[("service", "web")]),
        ];
        let info = build_field_info(records.into_iter());
        let service = info.iter().find(|f| f.name == "service").unwrap();
        assert_eq!(service.top_values, vec!["api".to_string(), "web".to_string()]);
    }
}
