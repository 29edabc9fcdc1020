//! Raw fallback: used whenever no other format accepts a line. Never
//! rejects.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::model::Record;
use crate::parser::traits::LineFormat;

pub struct RawFormat;

impl LineFormat for RawFormat {
    fn name(&self) -> &'static str {
        "raw"
    }

    fn accepts(&self, _line: &str) -> bool {
        true
    }

    fn parse(&self, line: &str, id: String, ingest_now: DateTime<Utc>) -> Record {
        Record::new(id, ingest_now, "", line.to_string(), IndexMap::new(), line.to_string())
    }
}
