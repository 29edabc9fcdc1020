//! Ingest supervisor (§4.5): owns stdin, turns lines into records, writes
//! them, and fans them out. Never aborts the loop on a bad line.

use std::sync::Arc;

use chrono::Utc;
use engine::model::IdGenerator;
use engine::parser::Detector;
use engine::{Broadcaster, Store};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::config::FormatMode;

/// A line longer than this is treated as oversized and skipped rather than
/// parsed (§4.5 "malformed or oversized").
const MAX_LINE_BYTES: usize = 1_048_576;

pub async fn run(store: Arc<Store>, broadcaster: Broadcaster, format: FormatMode) {
    let detector = Detector::new();
    let ids = IdGenerator::new();
    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break, // EOF
            Err(e) => {
                warn!(error = %e, "stdin read error, stopping ingest");
                break;
            }
        };

        if line.len() > MAX_LINE_BYTES {
            warn!(bytes = line.len(), "skipping oversized line");
            continue;
        }

        let record = match format {
            FormatMode::Auto => detector.parse(&line, ids.generate(), Utc::now()),
            FormatMode::Json => match detector.parse_as(&line, "json", ids.generate(), Utc::now()) {
                Ok(r) => r,
                Err(e) => {
                    warn!(error = %e, line = %line, "skipping line that doesn't match --format json");
                    continue;
                }
            },
            FormatMode::Logfmt => match detector.parse_as(&line, "logfmt", ids.generate(), Utc::now()) {
                Ok(r) => r,
                Err(e) => {
                    warn!(error = %e, line = %line, "skipping line that doesn't match --format logfmt");
                    continue;
                }
            },
        };

        if let Err(e) = store.write(record.clone()).await {
            warn!(error = %e, "failed to write record, skipping");
            continue;
        }
        broadcaster.publish(&record);
    }

    if let Err(e) = store.sync().await {
        warn!(error = %e, "failed to sync store after stdin EOF");
    }
}
