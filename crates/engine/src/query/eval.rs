//! Evaluates a compiled [`Filter`] against a [`Record`].

use regex::Regex;

use crate::model::Record;

use super::ast::Filter;

impl Filter {
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Filter::All => true,
            Filter::And(l, r) => l.matches(record) && r.matches(record),
            Filter::Or(l, r) => l.matches(record) || r.matches(record),
            Filter::Not(inner) => !inner.matches(record),
            Filter::Field { name, value, exact } => match record.field_as_string(name) {
                None => false,
                Some(actual) => {
                    if *exact {
                        actual.eq_ignore_ascii_case(value)
                    } else {
                        actual.to_lowercase().contains(&value.to_lowercase())
                    }
                }
            },
            Filter::Keyword(word) => {
                let needle = word.to_lowercase();
                if record.message.to_lowercase().contains(&needle) {
                    return true;
                }
                record
                    .fields
                    .values()
                    .any(|v| v.as_display_string().to_lowercase().contains(&needle))
            }
            Filter::Wildcard { field, pattern } => match record.field_as_string(field) {
                None => false,
                Some(actual) => wildcard_regex(pattern).is_match(&actual),
            },
            Filter::TimestampRange { start, end } => {
                if let Some(s) = start {
                    if record.timestamp < *s {
                        return false;
                    }
                }
                if let Some(e) = end {
                    if record.timestamp > *e {
                        return false;
                    }
                }
                true
            }
            Filter::NumericRange { field, start, end } => match record.field_as_f64(field) {
                None => false,
                Some(n) => {
                    if let Some(s) = start {
                        if n < *s {
                            return false;
                        }
                    }
                    if let Some(e) = end {
                        if n > *e {
                            return false;
                        }
                    }
                    true
                }
            },
        }
    }
}

fn wildcard_regex(pattern: &str) -> Regex {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("(?i)^{}$", body)).expect("wildcard pattern always compiles")
}
