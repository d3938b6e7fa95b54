//! Embedded key-field-value store with logical-clock time travel and lazy TTL.
//!
//! ## Features
//! - **Records of fields**: each key holds a set of named fields
//! - **Prefix scans**: sorted `field(value)` listings, optionally filtered by field-name prefix
//! - **Logical time**: timed operations take a caller-supplied `i64` timestamp; no clock is read
//! - **Lazy TTL**: expired fields are filtered on read and stay stored until overwritten,
//!   deleted, or purged with `purge_expired_at()`
//! - **History**: optional bounded per-field mutation log (with `time-index` feature)
//! - **Thread-safe wrapper**: `SyncStore` (with `sync` feature)
//!
//! ## TTL Behavior
//! A field written with `set_at_with_ttl(.., t, ttl)` is visible to every timed
//! read at `q <= t + ttl` and hidden afterwards. Fields written with `set` or
//! `set_at` never expire. Present-time reads (`get`, `scan`) do not look at
//! expiry at all.
//!
//! ```rust
//! use fieldtime::RecordStore;
//!
//! let mut store = RecordStore::new();
//! store.set_at("user1", "name", "Alice", 1);
//! store.set_at("user1", "age", "30", 2);
//! store.set_at_with_ttl("user1", "temp", "x", 4, 2);
//!
//! assert_eq!(store.get_at("user1", "temp", 6).as_deref(), Some("x"));
//! assert_eq!(store.get_at("user1", "temp", 7), None);
//! assert_eq!(store.scan_at("user1", 7), vec!["age(30)", "name(Alice)"]);
//!
//! // Expired fields are still stored until purged
//! assert_eq!(store.field_count(), 3);
//! let purged = store.purge_expired_at(7);
//! assert_eq!(purged.fields_removed, 1);
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use builder::StoreBuilder;
pub use config::Config;
pub use error::{FieldTimeError, Result};
pub use store::{RecordStore, TemporalStore};

#[cfg(feature = "sync")]
pub use store::SyncStore;

pub use types::{Entry, NEVER_EXPIRES, PurgeStats, StoreStats, Timestamp};
#[cfg(feature = "time-index")]
pub use types::{HistoryEntry, HistoryEventKind};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Config, FieldTimeError, RecordStore, Result, StoreBuilder, TemporalStore};

    #[cfg(feature = "sync")]
    pub use crate::SyncStore;

    pub use crate::{NEVER_EXPIRES, PurgeStats, StoreStats, Timestamp};
}
