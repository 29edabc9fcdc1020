//! Retention sweeps (§4.2): size-based (shrink to 20% under budget) and
//! time-based (drop anything older than `retention_days`). Both run inside
//! `spawn_blocking` call sites in [`super::Store`]; this module is plain
//! synchronous sled code.

use chrono::{DateTime, Duration, Utc};

use crate::model::Record;

use super::errors::StoreError;
use super::keys;

const DELETE_CHUNK: usize = 200;

#[derive(Debug, Clone, Copy, Default)]
pub struct RetentionConfig {
    pub max_size_bytes: Option<u64>,
    pub retention_days: Option<i64>,
}

/// Runs whichever policies are configured; returns the total number of
/// records removed. Both policies may fire in one call.
pub fn run_sweep(
    db: &sled::Db,
    primary: &sled::Tree,
    by_level: &sled::Tree,
    config: &RetentionConfig,
) -> Result<u64, StoreError> {
    let mut deleted = 0;
    if let Some(days) = config.retention_days {
        let cutoff = Utc::now() - Duration::days(days);
        deleted += delete_older_than(primary, by_level, cutoff)?;
    }
    if let Some(budget) = config.max_size_bytes {
        deleted += shrink_to_budget(db, primary, by_level, budget)?;
    }
    Ok(deleted)
}

/// Deletes every primary/by-level pair with `timestamp < cutoff`. Used both
/// by retention and directly by `Store::delete_older_than`.
pub fn delete_older_than(
    primary: &sled::Tree,
    by_level: &sled::Tree,
    cutoff: DateTime<Utc>,
) -> Result<u64, StoreError> {
    let upper = keys::primary_seek_start(cutoff);
    let mut deleted = 0u64;
    loop {
        let batch = collect_batch(primary, keys::primary_prefix(), &upper, DELETE_CHUNK)?;
        if batch.is_empty() {
            break;
        }
        deleted += batch.len() as u64;
        delete_batch(primary, by_level, &batch)?;
    }
    Ok(deleted)
}

/// Deletes every primary/by-level pair whose level matches exactly.
pub fn delete_by_level(primary: &sled::Tree, by_level: &sled::Tree, level: &str) -> Result<u64, StoreError> {
    let prefix = keys::by_level_prefix(level);
    let mut deleted = 0u64;
    loop {
        let ids: Vec<Vec<u8>> = by_level
            .scan_prefix(&prefix)
            .take(DELETE_CHUNK)
            .map(|item| item.map(|(k, _)| k.to_vec()))
            .collect::<Result<Vec<_>, _>>()?;
        if ids.is_empty() {
            break;
        }
        let mut batch = Vec::with_capacity(ids.len());
        for by_level_key in ids {
            if let Some(id_bytes) = by_level.get(&by_level_key)? {
                if let Some((_, ts, _)) = parse_by_level_key(&by_level_key) {
                    let id = String::from_utf8_lossy(&id_bytes).to_string();
                    batch.push((keys::primary_key(ts, &id), by_level_key.to_vec()));
                }
            }
        }
        if batch.is_empty() {
            break;
        }
        deleted += batch.len() as u64;
        delete_pairs(primary, by_level, &batch)?;
    }
    Ok(deleted)
}

pub fn delete_all(primary: &sled::Tree, by_level: &sled::Tree) -> Result<u64, StoreError> {
    let mut deleted = 0u64;
    loop {
        let batch = collect_any_batch(primary, DELETE_CHUNK)?;
        if batch.is_empty() {
            break;
        }
        deleted += batch.len() as u64;
        delete_batch(primary, by_level, &batch)?;
    }
    Ok(deleted)
}

fn shrink_to_budget(
    db: &sled::Db,
    primary: &sled::Tree,
    by_level: &sled::Tree,
    budget_bytes: u64,
) -> Result<u64, StoreError> {
    let target = (budget_bytes as f64 * 0.8) as u64;
    let mut deleted = 0u64;
    loop {
        let size = db.size_on_disk()?;
        if size <= target {
            break;
        }
        let batch = collect_any_batch(primary, DELETE_CHUNK)?;
        if batch.is_empty() {
            break;
        }
        deleted += batch.len() as u64;
        delete_batch(primary, by_level, &batch)?;
    }
    Ok(deleted)
}

fn collect_any_batch(primary: &sled::Tree, limit: usize) -> Result<Vec<(Vec<u8>, Record)>, StoreError> {
    let mut out = Vec::with_capacity(limit);
    for item in primary.scan_prefix(keys::primary_prefix()) {
        let (k, v) = item?;
        let record: Record = serde_json::from_slice(&v)?;
        out.push((k.to_vec(), record));
        if out.len() >= limit {
            break;
        }
    }
    Ok(out)
}

fn collect_batch(
    primary: &sled::Tree,
    lower: &[u8],
    upper: &[u8],
    limit: usize,
) -> Result<Vec<(Vec<u8>, Record)>, StoreError> {
    let mut out = Vec::with_capacity(limit);
    for item in primary.range(lower.to_vec()..upper.to_vec()) {
        let (k, v) = item?;
        let record: Record = serde_json::from_slice(&v)?;
        out.push((k.to_vec(), record));
        if out.len() >= limit {
            break;
        }
    }
    Ok(out)
}

fn delete_batch(primary: &sled::Tree, by_level: &sled::Tree, batch: &[(Vec<u8>, Record)]) -> Result<(), StoreError> {
    let pairs: Vec<(Vec<u8>, Vec<u8>)> = batch
        .iter()
        .map(|(pk, record)| (pk.clone(), keys::by_level_key(&record.level, record.timestamp, &record.id)))
        .collect();
    delete_pairs(primary, by_level, &pairs)
}

fn delete_pairs(primary: &sled::Tree, by_level: &sled::Tree, pairs: &[(Vec<u8>, Vec<u8>)]) -> Result<(), StoreError> {
    use sled::Transactional;

    (primary, by_level)
        .transaction(|(tx_primary, tx_by_level)| {
            for (pk, blk) in pairs {
                tx_primary.remove(pk.as_slice())?;
                tx_by_level.remove(blk.as_slice())?;
            }
            Ok(())
        })
        .map_err(StoreError::from)
}

fn parse_by_level_key(key: &[u8]) -> Option<(String, DateTime<Utc>, String)> {
    let s = std::str::from_utf8(key).ok()?;
    let rest = s.strip_prefix("index:level:")?;
    let mut parts = rest.rsplitn(3, ':');
    let id = parts.next()?;
    let nanos: i64 = parts.next()?.parse().ok()?;
    let level = parts.next()?;
    let ts = DateTime::<Utc>::from_timestamp(nanos / 1_000_000_000, (nanos % 1_000_000_000) as u32)?;
    Some((level.to_string(), ts, id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_by_level_key_round_trip() {
        let ts = Utc::now();
        let key = keys::by_level_key("ERROR", ts, "abcd1234abcd1234");
        let (level, parsed_ts, id) = parse_by_level_key(&key).unwrap();
        assert_eq!(level, "ERROR");
        assert_eq!(id, "abcd1234abcd1234");
        assert_eq!(parsed_ts.timestamp(), ts.timestamp());
    }
}
