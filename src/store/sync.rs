//! Thread-safe wrapper for concurrent store access.
//!
//! `SyncStore` wraps a [`RecordStore`] in `Arc<Mutex<_>>`. A single mutex
//! guards every operation, reads included, so callers on different threads
//! observe one total order of operations.
//!
//! # Features
//!
//! Enable the `sync` feature to use this module:
//!
//! ```toml
//! [dependencies]
//! fieldtime = { version = "0.1", features = ["sync"] }
//! ```
//!
//! # Examples
//!
//! ```rust
//! use fieldtime::SyncStore;
//! use std::thread;
//!
//! let store = SyncStore::new();
//! let writer = store.clone();
//!
//! let handle = thread::spawn(move || {
//!     writer.set_at_with_ttl("session", "token", "abc", 10, 5);
//! });
//! handle.join().unwrap();
//!
//! assert_eq!(store.get_at("session", "token", 15).as_deref(), Some("abc"));
//! ```

use super::{RecordStore, TemporalStore};
use crate::config::Config;
use crate::error::Result;
use crate::types::{PurgeStats, StoreStats, Timestamp};
use parking_lot::Mutex;
use std::sync::Arc;

/// Thread-safe wrapper around `RecordStore` using `Arc<Mutex<RecordStore>>`.
///
/// Cloning is cheap and every clone shares the same underlying store.
#[derive(Clone, Default)]
pub struct SyncStore {
    inner: Arc<Mutex<RecordStore>>,
}

impl SyncStore {
    /// Create an empty store with default configuration.
    pub fn new() -> Self {
        Self::from_store(RecordStore::new())
    }

    /// Create an empty store with a custom configuration.
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self::from_store(RecordStore::with_config(config)?))
    }

    /// Take ownership of an existing store.
    pub fn from_store(store: RecordStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Run several operations under one lock acquisition.
    ///
    /// ```rust
    /// use fieldtime::SyncStore;
    ///
    /// let store = SyncStore::new();
    /// let moved = store.with_store(|s| {
    ///     s.set("k", "old", "v");
    ///     let value = s.get("k", "old");
    ///     s.delete("k", "old");
    ///     if let Some(value) = value {
    ///         s.set("k", "new", value);
    ///     }
    ///     s.scan("k")
    /// });
    /// assert_eq!(moved, vec!["new(v)"]);
    /// ```
    pub fn with_store<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut RecordStore) -> R,
    {
        f(&mut self.inner.lock())
    }

    /// Get store statistics.
    pub fn stats(&self) -> StoreStats {
        self.inner.lock().stats()
    }

    // ===== Present-time operations =====

    pub fn set(&self, key: &str, field: &str, value: impl Into<String>) {
        self.inner.lock().set(key, field, value)
    }

    pub fn get(&self, key: &str, field: &str) -> Option<String> {
        self.inner.lock().get(key, field)
    }

    pub fn delete(&self, key: &str, field: &str) -> bool {
        self.inner.lock().delete(key, field)
    }

    pub fn scan(&self, key: &str) -> Vec<String> {
        self.inner.lock().scan(key)
    }

    pub fn scan_by_prefix(&self, key: &str, prefix: &str) -> Vec<String> {
        self.inner.lock().scan_by_prefix(key, prefix)
    }

    // ===== Timed operations =====

    pub fn set_at(&self, key: &str, field: &str, value: impl Into<String>, timestamp: Timestamp) {
        self.inner.lock().set_at(key, field, value, timestamp)
    }

    pub fn set_at_with_ttl(
        &self,
        key: &str,
        field: &str,
        value: impl Into<String>,
        timestamp: Timestamp,
        ttl: i64,
    ) {
        self.inner
            .lock()
            .set_at_with_ttl(key, field, value, timestamp, ttl)
    }

    pub fn delete_at(&self, key: &str, field: &str, timestamp: Timestamp) -> bool {
        self.inner.lock().delete_at(key, field, timestamp)
    }

    pub fn get_at(&self, key: &str, field: &str, timestamp: Timestamp) -> Option<String> {
        self.inner.lock().get_at(key, field, timestamp)
    }

    pub fn scan_at(&self, key: &str, timestamp: Timestamp) -> Vec<String> {
        self.inner.lock().scan_at(key, timestamp)
    }

    pub fn scan_by_prefix_at(&self, key: &str, prefix: &str, timestamp: Timestamp) -> Vec<String> {
        self.inner
            .lock()
            .scan_by_prefix_at(key, prefix, timestamp)
    }

    // ===== Maintenance =====

    /// Physically remove every entry that is no longer visible at `timestamp`.
    pub fn purge_expired_at(&self, timestamp: Timestamp) -> PurgeStats {
        self.inner.lock().purge_expired_at(timestamp)
    }
}

impl TemporalStore for SyncStore {
    fn set(&mut self, key: &str, field: &str, value: &str) {
        SyncStore::set(self, key, field, value)
    }

    fn get(&self, key: &str, field: &str) -> Option<String> {
        SyncStore::get(self, key, field)
    }

    fn delete(&mut self, key: &str, field: &str) -> bool {
        SyncStore::delete(self, key, field)
    }

    fn scan(&self, key: &str) -> Vec<String> {
        SyncStore::scan(self, key)
    }

    fn scan_by_prefix(&self, key: &str, prefix: &str) -> Vec<String> {
        SyncStore::scan_by_prefix(self, key, prefix)
    }

    fn set_at(&mut self, key: &str, field: &str, value: &str, timestamp: Timestamp) {
        SyncStore::set_at(self, key, field, value, timestamp)
    }

    fn set_at_with_ttl(
        &mut self,
        key: &str,
        field: &str,
        value: &str,
        timestamp: Timestamp,
        ttl: i64,
    ) {
        SyncStore::set_at_with_ttl(self, key, field, value, timestamp, ttl)
    }

    fn delete_at(&mut self, key: &str, field: &str, timestamp: Timestamp) -> bool {
        SyncStore::delete_at(self, key, field, timestamp)
    }

    fn get_at(&self, key: &str, field: &str, timestamp: Timestamp) -> Option<String> {
        SyncStore::get_at(self, key, field, timestamp)
    }

    fn scan_at(&self, key: &str, timestamp: Timestamp) -> Vec<String> {
        SyncStore::scan_at(self, key, timestamp)
    }

    fn scan_by_prefix_at(&self, key: &str, prefix: &str, timestamp: Timestamp) -> Vec<String> {
        SyncStore::scan_by_prefix_at(self, key, prefix, timestamp)
    }
}
