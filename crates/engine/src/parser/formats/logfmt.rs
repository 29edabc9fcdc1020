//! Logfmt (`key=value`) parser and acceptance predicate (§4.1).

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::model::{FieldValue, Record};
use crate::parser::extract;
use crate::parser::traits::LineFormat;

pub struct LogfmtFormat;

impl LineFormat for LogfmtFormat {
    fn name(&self) -> &'static str {
        "logfmt"
    }

    fn accepts(&self, line: &str) -> bool {
        let pairs = tokenize(line);
        let has_msg_or_level = pairs.iter().any(|(k, _)| k == "msg" || k == "level");
        let has_companion = pairs
            .iter()
            .any(|(k, _)| k == "source" || k == "time" || k == "error");
        has_msg_or_level && has_companion
    }

    fn parse(&self, line: &str, id: String, ingest_now: DateTime<Utc>) -> Record {
        let mut fields: IndexMap<String, FieldValue> = IndexMap::new();
        for (k, v) in tokenize(line) {
            fields.insert(k, FieldValue::String(v));
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

/// Tokenize a logfmt line into `key=value` pairs.
///
/// Pairs are separated by runs of whitespace. A value starting with `"` is
/// read until the matching closing quote, honoring `\"` and `\\` as the only
/// two escape sequences. An unquoted value terminates at the next run of
/// whitespace. A bare `key=` (empty value) is allowed.
pub fn tokenize(line: &str) -> Vec<(String, String)> {
    let mut chars = line.chars().peekable();
    let mut pairs = Vec::new();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c == '=' || c.is_whitespace() {
                break;
            }
            key.push(c);
            chars.next();
        }

        if key.is_empty() {
            // Stray character with no key (e.g. a bare '='); skip it so we
            // don't spin forever.
            chars.next();
            continue;
        }

        if chars.peek() != Some(&'=') {
            // A token with no '=' at all — not a pair, skip and continue.
            continue;
        }
        chars.next(); // consume '='

        let value = if chars.peek() == Some(&'"') {
            chars.next();
            let mut val = String::new();
            let mut escaped = false;
            for c in chars.by_ref() {
                if escaped {
                    val.push(c);
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    break;
                } else {
                    val.push(c);
                }
            }
            val
        } else {
            let mut val = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                val.push(c);
                chars.next();
            }
            val
        };

        pairs.push((key, value));
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_quoted_and_unquoted_values() {
        let pairs = tokenize(r#"level=info msg="hello world" retry=3"#);
        assert_eq!(
            pairs,
            vec![
                ("level".to_string(), "info".to_string()),
                ("msg".to_string(), "hello world".to_string()),
                ("retry".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn honors_backslash_escapes() {
        let pairs = tokenize(r#"msg="a \"quoted\" word" time=2026"#);
        assert_eq!(pairs[0], ("msg".to_string(), "a \"quoted\" word".to_string()));
    }

    #[test]
    fn empty_value_is_allowed() {
        let pairs = tokenize("key= level=info source=app");
        assert_eq!(pairs[0], ("key".to_string(), String::new()));
    }

    #[test]
    fn accepts_requires_msg_or_level_plus_companion() {
        let f = LogfmtFormat;
        assert!(f.accepts(r#"time=2026-02-18T10:30:45Z level=ERROR msg="Connection timeout" service=api retry=3"#));
        assert!(!f.accepts("just some prose with a = sign in it"));
        assert!(!f.accepts("msg=hello")); // no companion key
    }

    #[test]
    fn parses_scenario_a() {
        let f = LogfmtFormat;
        let line = r#"time=2026-02-18T10:30:45Z level=ERROR msg="Connection timeout" service=api retry=3"#;
        let r = f.parse(line, "abc".into(), Utc::now());
        assert_eq!(r.level, "ERROR");
        assert_eq!(r.message, "Connection timeout");
        assert_eq!(r.fields.get("service"), Some(&FieldValue::String("api".to_string())));
        assert_eq!(r.fields.get("retry"), Some(&FieldValue::String("3".to_string())));
        assert_eq!(r.raw, line);
    }
}
