use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::model::Record;
use crate::query::Filter;

/// Queue depth per subscriber (§4.4: "capacity ~ 100").
pub const QUEUE_CAPACITY: usize = 100;

/// A message delivered to a subscriber over its outbound queue.
#[derive(Debug, Clone)]
pub enum Outbound {
    Results { records: Vec<Record>, total: usize, took_ms: u64 },
    Log(Record),
    Heartbeat,
}

pub struct Subscriber {
    pub id: u64,
    pub filter: Filter,
    pub time_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    sender: mpsc::Sender<Outbound>,
    pub cancel: CancellationToken,
    pub dropped: Arc<AtomicU64>,
}

impl Subscriber {
    pub fn new(id: u64, filter: Filter, time_range: Option<(DateTime<Utc>, DateTime<Utc>)>) -> (Self, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let subscriber = Self {
            id,
            filter,
            time_range,
            sender: tx,
            cancel: CancellationToken::new(),
            dropped: Arc::new(AtomicU64::new(0)),
        };
        (subscriber, rx)
    }

    pub fn accepts(&self, record: &Record) -> bool {
        if let Some((start, end)) = self.time_range {
            if record.timestamp < start || record.timestamp > end {
                return false;
            }
        }
        self.filter.matches(record)
    }

    /// Non-blocking enqueue; a full queue drops the message and bumps the
    /// drop counter rather than stalling the publisher (§4.4/§9).
    pub fn try_send(&self, message: Outbound) {
        if self.sender.try_send(message).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Heartbeats don't count as data loss, so a full queue is silently
    /// skipped rather than bumping the drop counter.
    pub fn try_send_heartbeat(&self) {
        let _ = self.sender.try_send(Outbound::Heartbeat);
    }
}
