//! Engine — the ingestion/storage/subscription core for `peek`.
//!
//! Domain-driven module structure, mirroring the split the rest of this
//! workspace uses: each module owns one responsibility and talks to its
//! neighbours through plain data, not shared mutable state.

pub mod broadcast;
pub mod model;
pub mod parser;
pub mod query;
pub mod store;

pub use broadcast::{Broadcaster, Outbound};
pub use model::{FieldInfo, FieldValue, Record};
pub use query::{compile, Filter, QueryParseError};
pub use store::{RetentionConfig, ScanControl, Stats, Store, StoreError};
