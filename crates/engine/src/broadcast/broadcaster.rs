//! Subscription manager (§4.4): the Broadcaster is the sole mutator of the
//! subscriber registry, held under a `parking_lot::Mutex` only for the short
//! `try_send` loop — no I/O inside the critical section (§5).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::model::Record;
use crate::query::Filter;

use super::subscriber::{Outbound, Subscriber};

/// Heartbeat period (§4.4/§6.2: "~ every 30s").
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct Broadcaster {
    subscribers: Arc<Mutex<Vec<Arc<Subscriber>>>>,
    next_id: Arc<AtomicU64>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Registers a subscriber, optionally delivering an initial snapshot as
    /// the first outbound message. Spawns the subscriber's heartbeat pump.
    /// Returns the outbound receiver and its cancellation token.
    pub fn subscribe(
        &self,
        filter: Filter,
        time_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
        snapshot: Option<(Vec<Record>, usize, u64)>,
    ) -> (mpsc::Receiver<Outbound>, CancellationToken) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (subscriber, rx) = Subscriber::new(id, filter, time_range);
        let subscriber = Arc::new(subscriber);

        if let Some((records, total, took_ms)) = snapshot {
            subscriber.try_send(Outbound::Results { records, total, took_ms });
        }

        let cancel = subscriber.cancel.clone();
        self.subscribers.lock().push(subscriber.clone());
        self.spawn_heartbeat(subscriber.clone());

        let registry = self.subscribers.clone();
        let cancel_for_cleanup = cancel.clone();
        tokio::spawn(async move {
            cancel_for_cleanup.cancelled().await;
            registry.lock().retain(|s| s.id != id);
        });

        (rx, cancel)
    }

    /// Non-blocking fan-out: records a dropped delivery per subscriber
    /// instead of ever blocking on a slow consumer (§4.4/§9).
    pub fn publish(&self, record: &Record) {
        let subscribers = self.subscribers.lock();
        for subscriber in subscribers.iter() {
            if subscriber.cancel.is_cancelled() {
                continue;
            }
            if subscriber.accepts(record) {
                subscriber.try_send(Outbound::Log(record.clone()));
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Cancels every registered subscriber (§4.5 shutdown order: stop
    /// accepting new connections, then cancel all subscribers, then close
    /// the store).
    pub fn shutdown(&self) {
        for subscriber in self.subscribers.lock().iter() {
            subscriber.cancel.cancel();
        }
    }

    fn spawn_heartbeat(&self, subscriber: Arc<Subscriber>) {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(HEARTBEAT_INTERVAL);
            ticker.tick().await; // first tick fires immediately; skip it
            loop {
                tokio::select! {
                    _ = subscriber.cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        if subscriber.cancel.is_cancelled() {
                            break;
                        }
                        subscriber.try_send_heartbeat();
                    }
                }
            }
        });
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use crate::model::IdGenerator;

    use super::*;

    fn record(level: &str) -> Record {
        Record::new(
            IdGenerator::new().generate(),
            Utc::now(),
            level,
            "hi".to_string(),
            IndexMap::new(),
            "hi".to_string(),
        )
    }

    #[tokio::test]
    async fn subscriber_receives_matching_publishes_in_order() {
        let b = Broadcaster::new();
        let (mut rx, _cancel) = b.subscribe(Filter::All, None, None);
        for _ in 0..3 {
            b.publish(&record("INFO"));
        }
        for _ in 0..3 {
            assert!(matches!(rx.recv().await, Some(Outbound::Log(_))));
        }
    }

    #[tokio::test]
    async fn filter_excludes_non_matching_records() {
        let b = Broadcaster::new();
        let filter = crate::query::compile("level:ERROR").unwrap();
        let (mut rx, _cancel) = b.subscribe(filter, None, None);
        b.publish(&record("INFO"));
        b.publish(&record("ERROR"));
        match rx.recv().await {
            Some(Outbound::Log(r)) => assert_eq!(r.level, "ERROR"),
            other => panic!("unexpected message: {:?}", other.is_some()),
        }
    }

    #[tokio::test]
    async fn full_queue_drops_overflow_and_recovers_after_draining() {
        let b = Broadcaster::new();
        let (mut rx, _cancel) = b.subscribe(Filter::All, None, None);
        for _ in 0..150 {
            b.publish(&record("ERROR"));
        }
        let mut received = 0;
        while rx.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, super::subscriber::QUEUE_CAPACITY);

        for _ in 0..10 {
            b.publish(&record("ERROR"));
        }
        let mut more = 0;
        while rx.try_recv().is_ok() {
            more += 1;
        }
        assert_eq!(more, 10);
    }

    #[tokio::test]
    async fn cancel_removes_subscriber_from_registry() {
        let b = Broadcaster::new();
        let (_rx, cancel) = b.subscribe(Filter::All, None, None);
        assert_eq!(b.subscriber_count(), 1);
        cancel.cancel();
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(b.subscriber_count(), 0);
    }
}
