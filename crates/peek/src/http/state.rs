use std::sync::Arc;

use chrono::{DateTime, Utc};
use engine::{Broadcaster, Store};

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub broadcaster: Broadcaster,
    /// Set when the process starts in ingest mode with fresh-mode enabled
    /// (§4.5): records older than this instant are hidden from every query
    /// and subscription unless the `--all` flag disabled the filter.
    pub fresh_cutoff: Option<DateTime<Utc>>,
}

impl AppState {
    pub fn new(store: Arc<Store>, broadcaster: Broadcaster, config: &Config, process_start: DateTime<Utc>) -> Self {
        Self {
            store,
            broadcaster,
            fresh_cutoff: config.fresh_mode.then_some(process_start),
        }
    }
}
