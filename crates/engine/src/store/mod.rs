//! Persistent record store (§4.2): a sled-backed KV engine with a primary
//! time-ordered tree and a by-level secondary index, reader/writer lock
//! discipline, and size/time retention sweeps.

mod errors;
mod fields;
mod keys;
mod retention;

pub use errors::StoreError;
pub use fields::MAX_DISTINCT_VALUES_PER_FIELD;
pub use retention::RetentionConfig;

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::model::{FieldInfo, Record};
use crate::query::Filter;

/// Retention runs once at startup and again every `RETENTION_INTERVAL`
/// commits (§4.2: "N ~ 1000").
const RETENTION_INTERVAL: u64 = 1000;

/// Continuation signal returned by a [`Store::scan`] callback.
pub enum ScanControl {
    Continue,
    Stop,
}

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub total_logs: u64,
    pub db_size_mb: f64,
    pub levels: IndexMap<String, u64>,
}

pub struct Store {
    db: sled::Db,
    primary: sled::Tree,
    by_level: sled::Tree,
    /// Shared for writes/queries/scans, exclusive for deletes/retention —
    /// directly implementing §4.2's "write takes the reader lock, deletion
    /// operations take the writer lock" rule.
    lock: RwLock<()>,
    retention_config: RetentionConfig,
    commits: AtomicU64,
    retention_in_flight: AtomicBool,
}

impl Store {
    pub async fn open(path: impl AsRef<Path>, retention_config: RetentionConfig) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let (db, primary, by_level) = tokio::task::spawn_blocking(move || -> Result<_, StoreError> {
            let db = sled::open(path)?;
            let primary = db.open_tree("primary")?;
            let by_level = db.open_tree("by_level")?;
            Ok((db, primary, by_level))
        })
        .await??;

        let store = Self {
            db,
            primary,
            by_level,
            lock: RwLock::new(()),
            retention_config,
            commits: AtomicU64::new(0),
            retention_in_flight: AtomicBool::new(false),
        };
        store.run_retention().await?;
        Ok(store)
    }

    pub async fn write(&self, record: Record) -> Result<(), StoreError> {
        let guard = self.lock.read().await;
        let primary = self.primary.clone();
        let by_level = self.by_level.clone();
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            use sled::Transactional;
            let payload = serde_json::to_vec(&record)?;
            let pk = keys::primary_key(record.timestamp, &record.id);
            let blk = keys::by_level_key(&record.level, record.timestamp, &record.id);
            (&primary, &by_level)
                .transaction(|(tx_primary, tx_by_level)| {
                    tx_primary.insert(pk.as_slice(), payload.as_slice())?;
                    tx_by_level.insert(blk.as_slice(), record.id.as_bytes())?;
                    Ok(())
                })
                .map_err(StoreError::from)
        })
        .await??;
        drop(guard);

        let count = self.commits.fetch_add(1, Ordering::Relaxed) + 1;
        if count % RETENTION_INTERVAL == 0 {
            self.run_retention().await?;
        }
        Ok(())
    }

    pub async fn query(
        &self,
        filter: Filter,
        time_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<Record>, usize), StoreError> {
        let guard = self.lock.read().await;
        let primary = self.primary.clone();
        let result = tokio::task::spawn_blocking(move || -> Result<(Vec<Record>, usize), StoreError> {
            let (lower, upper) = match time_range {
                Some((start, end)) => (keys::primary_seek_start(start), keys::primary_seek_end(end)),
                None => (keys::primary_prefix().to_vec(), primary_upper_bound()),
            };
            let mut total = 0usize;
            let mut page = Vec::new();
            for item in primary.range(lower..upper) {
                let (_, v) = item?;
                let record: Record = serde_json::from_slice(&v)?;
                if filter.matches(&record) {
                    if total >= offset && page.len() < limit {
                        page.push(record);
                    }
                    total += 1;
                }
            }
            Ok((page, total))
        })
        .await?;
        drop(guard);
        result
    }

    /// Forward iteration over every stored record. Per §4.2, the lock is not
    /// held across the caller's callback: it is released before iteration
    /// starts.
    pub async fn scan<F>(&self, mut callback: F) -> Result<(), StoreError>
    where
        F: FnMut(Record) -> Result<ScanControl, StoreError> + Send + 'static,
    {
        let guard = self.lock.read().await;
        let primary = self.primary.clone();
        drop(guard);
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            for item in primary.scan_prefix(keys::primary_prefix()) {
                let (_, v) = item?;
                let record: Record = serde_json::from_slice(&v)?;
                match callback(record)? {
                    ScanControl::Continue => {}
                    ScanControl::Stop => break,
                }
            }
            Ok(())
        })
        .await?
    }

    pub async fn get_fields(&self, window: Option<(DateTime<Utc>, DateTime<Utc>)>) -> Result<Vec<FieldInfo>, StoreError> {
        let guard = self.lock.read().await;
        let primary = self.primary.clone();
        let result = tokio::task::spawn_blocking(move || -> Result<Vec<FieldInfo>, StoreError> {
            let (lower, upper) = match window {
                Some((start, end)) => (keys::primary_seek_start(start), keys::primary_seek_end(end)),
                None => (keys::primary_prefix().to_vec(), primary_upper_bound()),
            };
            let mut records = Vec::new();
            for item in primary.range(lower..upper) {
                let (_, v) = item?;
                records.push(serde_json::from_slice(&v)?);
            }
            Ok(fields::build_field_info(records.into_iter()))
        })
        .await?;
        drop(guard);
        result
    }

    pub async fn get_stats(&self) -> Result<Stats, StoreError> {
        let guard = self.lock.read().await;
        let db = self.db.clone();
        let primary = self.primary.clone();
        let by_level = self.by_level.clone();
        let result = tokio::task::spawn_blocking(move || -> Result<Stats, StoreError> {
            let total_logs = primary.len() as u64;
            let db_size_mb = db.size_on_disk()? as f64 / 1_000_000.0;
            let mut levels: IndexMap<String, u64> = IndexMap::new();
            for item in by_level.iter() {
                let (key, _) = item?;
                if let Some(level) = keys::level_from_by_level_key(&key) {
                    *levels.entry(level).or_insert(0) += 1;
                }
            }
            Ok(Stats {
                total_logs,
                db_size_mb,
                levels,
            })
        })
        .await?;
        drop(guard);
        result
    }

    pub async fn get_oldest_newest(&self) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>), StoreError> {
        let guard = self.lock.read().await;
        let primary = self.primary.clone();
        let result = tokio::task::spawn_blocking(move || -> Result<_, StoreError> {
            let oldest = primary
                .iter()
                .next()
                .transpose()?
                .and_then(|(k, _)| keys::parse_primary_key(&k))
                .and_then(|(nanos, _)| nanos_to_datetime(nanos));
            let newest = primary
                .iter()
                .next_back()
                .transpose()?
                .and_then(|(k, _)| keys::parse_primary_key(&k))
                .and_then(|(nanos, _)| nanos_to_datetime(nanos));
            Ok((oldest, newest))
        })
        .await?;
        drop(guard);
        result
    }

    pub async fn delete_all(&self) -> Result<u64, StoreError> {
        let guard = self.lock.write().await;
        let primary = self.primary.clone();
        let by_level = self.by_level.clone();
        let result = tokio::task::spawn_blocking(move || retention::delete_all(&primary, &by_level)).await?;
        drop(guard);
        result
    }

    pub async fn delete_by_level(&self, level: &str) -> Result<u64, StoreError> {
        let guard = self.lock.write().await;
        let primary = self.primary.clone();
        let by_level = self.by_level.clone();
        let level = level.to_string();
        let result = tokio::task::spawn_blocking(move || retention::delete_by_level(&primary, &by_level, &level)).await?;
        drop(guard);
        result
    }

    pub async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let guard = self.lock.write().await;
        let primary = self.primary.clone();
        let by_level = self.by_level.clone();
        let result = tokio::task::spawn_blocking(move || retention::delete_older_than(&primary, &by_level, cutoff)).await?;
        drop(guard);
        result
    }

    pub async fn compact(&self) -> Result<(), StoreError> {
        let guard = self.lock.write().await;
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || db.flush()).await??;
        drop(guard);
        Ok(())
    }

    pub async fn sync(&self) -> Result<(), StoreError> {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || db.flush()).await??;
        Ok(())
    }

    pub async fn close(&self) -> Result<(), StoreError> {
        self.sync().await
    }

    /// Runs the configured retention policies. Coalesced: if a sweep is
    /// already in flight, additional triggers are no-ops (§4.2).
    async fn run_retention(&self) -> Result<u64, StoreError> {
        if self
            .retention_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            return Ok(0);
        }
        let outcome = async {
            let guard = self.lock.write().await;
            let db = self.db.clone();
            let primary = self.primary.clone();
            let by_level = self.by_level.clone();
            let config = self.retention_config;
            let result = tokio::task::spawn_blocking(move || retention::run_sweep(&db, &primary, &by_level, &config)).await?;
            drop(guard);
            result
        }
        .await;
        self.retention_in_flight.store(false, Ordering::Release);
        match &outcome {
            Ok(0) => {}
            Ok(n) => info!(deleted = n, "retention sweep complete"),
            Err(e) => warn!(error = %e, "retention sweep failed"),
        }
        outcome
    }
}

fn nanos_to_datetime(nanos: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(nanos / 1_000_000_000, (nanos.rem_euclid(1_000_000_000)) as u32)
}

fn primary_upper_bound() -> Vec<u8> {
    // Anything starting with "log:" sorts below a single 0xff byte, since
    // every primary key's first byte is ASCII.
    vec![0xff]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IdGenerator;
    use indexmap::IndexMap as Map;
    use tempfile::tempdir;

    async fn open_store() -> (Store, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path(), RetentionConfig::default()).await.unwrap();
        (store, dir)
    }

    fn record(level: &str, message: &str) -> Record {
        Record::new(
            IdGenerator::new().generate(),
            Utc::now(),
            level,
            message.to_string(),
            Map::new(),
            message.to_string(),
        )
    }

    #[tokio::test]
    async fn write_then_query_round_trips() {
        let (store, _dir) = open_store().await;
        store.write(record("ERROR", "boom")).await.unwrap();
        let (page, total) = store.query(Filter::All, None, 10, 0).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(page[0].message, "boom");
    }

    #[tokio::test]
    async fn delete_by_level_removes_only_matching_records() {
        let (store, _dir) = open_store().await;
        store.write(record("ERROR", "a")).await.unwrap();
        store.write(record("INFO", "b")).await.unwrap();
        let deleted = store.delete_by_level("ERROR").await.unwrap();
        assert_eq!(deleted, 1);
        let (_, total) = store.query(Filter::All, None, 10, 0).await.unwrap();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn delete_older_than_respects_cutoff() {
        let (store, _dir) = open_store().await;
        store.write(record("INFO", "old")).await.unwrap();
        let cutoff = Utc::now() + chrono::Duration::seconds(1);
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        store.write(record("INFO", "new")).await.unwrap();
        let deleted = store.delete_older_than(cutoff).await.unwrap();
        assert_eq!(deleted, 1);
        let (page, _) = store.query(Filter::All, None, 10, 0).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].message, "new");
    }

    #[tokio::test]
    async fn get_fields_reports_builtins_and_discovered_fields() {
        let (store, _dir) = open_store().await;
        store.write(record("ERROR", "a")).await.unwrap();
        let info = store.get_fields(None).await.unwrap();
        assert!(info.iter().any(|f| f.name == "level"));
    }
}
