//! The temporal record store.
//!
//! This module defines [`RecordStore`], a two-level `key -> field -> entry`
//! map, and the [`TemporalStore`] trait listing its operation set.
//!
//! Every entry carries an inclusive expiry. Expired entries are never evicted
//! in the background; they stay in storage until overwritten, deleted, or
//! removed by an explicit [`RecordStore::purge_expired_at`], and the timed
//! operations simply filter them out.

use crate::builder::StoreBuilder;
use crate::config::Config;
use crate::error::Result;
#[cfg(feature = "time-index")]
use crate::types::HistoryEntry;
use crate::types::{Entry, PurgeStats, StoreStats, Timestamp};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

#[cfg(feature = "time-index")]
mod history;
mod internal;

#[cfg(feature = "sync")]
mod sync;

#[cfg(feature = "sync")]
pub use sync::SyncStore;

/// Fields of one record, kept in name order so prefix scans can seek.
pub(crate) type Record = BTreeMap<String, Entry>;

/// The operation set of a temporal key-field-value store.
///
/// Present-time operations (`set`, `get`, `delete`, `scan`, `scan_by_prefix`)
/// ignore expiry entirely. Timed operations take a caller-supplied logical
/// timestamp and treat a field as visible at `t` iff `t <= expiry`.
///
/// No operation fails: a missing key, a missing field, or an expired field is
/// reported as `None`, `false`, or an empty scan.
pub trait TemporalStore {
    /// Insert or replace a field that never expires.
    fn set(&mut self, key: &str, field: &str, value: &str);

    /// Current value of a field, regardless of expiry.
    fn get(&self, key: &str, field: &str) -> Option<String>;

    /// Remove a field. Returns `true` if it existed.
    fn delete(&mut self, key: &str, field: &str) -> bool;

    /// Every field of a record rendered as `field(value)`, sorted.
    fn scan(&self, key: &str) -> Vec<String>;

    /// Like [`scan`](Self::scan), restricted to field names starting with `prefix`.
    fn scan_by_prefix(&self, key: &str, prefix: &str) -> Vec<String>;

    /// Insert or replace a field that never expires. `timestamp` does not
    /// influence the stored expiry.
    fn set_at(&mut self, key: &str, field: &str, value: &str, timestamp: Timestamp);

    /// Insert or replace a field visible through `timestamp + ttl` inclusive.
    fn set_at_with_ttl(
        &mut self,
        key: &str,
        field: &str,
        value: &str,
        timestamp: Timestamp,
        ttl: i64,
    );

    /// Remove a field if it exists, expired or not. Returns `true` only if
    /// the field was still visible at `timestamp`.
    fn delete_at(&mut self, key: &str, field: &str, timestamp: Timestamp) -> bool;

    /// Value of a field if it is visible at `timestamp`.
    fn get_at(&self, key: &str, field: &str, timestamp: Timestamp) -> Option<String>;

    /// Fields visible at `timestamp`, rendered and sorted like [`scan`](Self::scan).
    fn scan_at(&self, key: &str, timestamp: Timestamp) -> Vec<String>;

    /// Fields starting with `prefix` and visible at `timestamp`.
    fn scan_by_prefix_at(&self, key: &str, prefix: &str, timestamp: Timestamp) -> Vec<String>;
}

/// In-memory temporal record store (single-threaded by design).
///
/// `RecordStore` owns all of its state; there is no global instance. To share
/// one between threads, wrap it in a single lock guarding every operation,
/// or enable the `sync` feature and use `SyncStore`.
///
/// # Examples
///
/// ```rust
/// use fieldtime::RecordStore;
///
/// let mut store = RecordStore::new();
/// store.set_at("user1", "name", "Alice", 1);
/// store.set_at_with_ttl("user1", "session", "abc", 4, 2);
///
/// assert_eq!(store.get_at("user1", "session", 6).as_deref(), Some("abc"));
/// assert_eq!(store.get_at("user1", "session", 7), None);
/// assert_eq!(store.scan_at("user1", 7), vec!["name(Alice)"]);
/// ```
#[derive(Debug)]
pub struct RecordStore {
    pub(crate) inner: StoreInner,
}

#[derive(Debug)]
pub(crate) struct StoreInner {
    /// Records by key; emptied records stay unless pruning is configured
    pub records: FxHashMap<String, Record>,
    pub stats: StoreStats,
    pub config: Config,
    #[cfg(feature = "time-index")]
    /// Optional per-field history tracker
    pub history: Option<history::HistoryTracker>,
}

impl RecordStore {
    /// Create an empty store with default configuration.
    pub fn new() -> Self {
        Self {
            inner: StoreInner::new_with_config(&Config::default()),
        }
    }

    /// Create an empty store with a custom configuration.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inner: StoreInner::new_with_config(&config),
        })
    }

    /// Create a builder for configuring a new store.
    ///
    /// ```rust
    /// use fieldtime::RecordStore;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let store = RecordStore::builder()
    ///     .prune_empty_records(true)
    ///     .build()?;
    /// assert!(store.config().prune_empty_records);
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get store statistics
    pub fn stats(&self) -> StoreStats {
        self.inner.stats.clone()
    }

    // ===== Present-time operations =====

    /// Insert or replace a field. The resulting entry never expires.
    pub fn set(&mut self, key: &str, field: &str, value: impl Into<String>) {
        self.inner.insert_entry(key, field, Entry::new(value), None);
    }

    /// Current value of a field. Expiry is not consulted.
    pub fn get(&self, key: &str, field: &str) -> Option<String> {
        self.inner
            .get_entry(key, field)
            .map(|entry| entry.value.clone())
    }

    /// Remove a field. Returns `false` if the key or the field does not exist.
    pub fn delete(&mut self, key: &str, field: &str) -> bool {
        match self.inner.remove_entry(key, field, None) {
            Some(_) => {
                self.inner.stats.record_delete(true);
                true
            }
            None => false,
        }
    }

    /// Every field of `key` as `field(value)`, sorted byte-wise by that string.
    ///
    /// ```rust
    /// use fieldtime::RecordStore;
    ///
    /// let mut store = RecordStore::new();
    /// store.set("user1", "name", "Alice");
    /// store.set("user1", "age", "30");
    /// assert_eq!(store.scan("user1"), vec!["age(30)", "name(Alice)"]);
    /// assert!(store.scan("nobody").is_empty());
    /// ```
    pub fn scan(&self, key: &str) -> Vec<String> {
        self.inner.render_fields(key, "", None)
    }

    /// Like [`scan`](Self::scan), restricted to fields whose name starts
    /// with `prefix` (case-sensitive, no wildcards).
    pub fn scan_by_prefix(&self, key: &str, prefix: &str) -> Vec<String> {
        self.inner.render_fields(key, prefix, None)
    }

    // ===== Timed operations =====

    /// Same as [`set`](Self::set). The entry never expires; `timestamp` is
    /// accepted for symmetry with the other timed writes and only appears in
    /// history.
    pub fn set_at(&mut self, key: &str, field: &str, value: impl Into<String>, timestamp: Timestamp) {
        self.inner
            .insert_entry(key, field, Entry::new(value), Some(timestamp));
    }

    /// Insert or replace a field with `expiry = timestamp + ttl`.
    ///
    /// The field is visible for every query time `q <= timestamp + ttl`.
    /// `ttl` is not checked for sign; a negative value produces an entry that
    /// is already expired at `timestamp`.
    pub fn set_at_with_ttl(
        &mut self,
        key: &str,
        field: &str,
        value: impl Into<String>,
        timestamp: Timestamp,
        ttl: i64,
    ) {
        self.inner.insert_entry(
            key,
            field,
            Entry::with_ttl(value, timestamp, ttl),
            Some(timestamp),
        );
    }

    /// Remove a field if it exists, whether or not it has expired.
    ///
    /// The return value reports liveness, not existence: `true` if the field
    /// was still visible at `timestamp`, `false` if it had already expired or
    /// was never there.
    ///
    /// ```rust
    /// use fieldtime::RecordStore;
    ///
    /// let mut store = RecordStore::new();
    /// store.set_at_with_ttl("k", "f", "v", 1, 2);
    /// assert!(!store.delete_at("k", "f", 5));
    /// assert_eq!(store.get_at("k", "f", 1), None);
    /// ```
    pub fn delete_at(&mut self, key: &str, field: &str, timestamp: Timestamp) -> bool {
        match self.inner.remove_entry(key, field, Some(timestamp)) {
            Some(removed) => {
                let was_live = removed.is_visible_at(timestamp);
                self.inner.stats.record_delete(was_live);
                was_live
            }
            None => false,
        }
    }

    /// Value of a field if it exists and `timestamp <= expiry`.
    pub fn get_at(&self, key: &str, field: &str, timestamp: Timestamp) -> Option<String> {
        self.inner
            .get_entry(key, field)
            .filter(|entry| entry.is_visible_at(timestamp))
            .map(|entry| entry.value.clone())
    }

    /// Fields of `key` visible at `timestamp`, rendered and sorted like [`scan`](Self::scan).
    pub fn scan_at(&self, key: &str, timestamp: Timestamp) -> Vec<String> {
        self.inner.render_fields(key, "", Some(timestamp))
    }

    /// Fields of `key` starting with `prefix` and visible at `timestamp`.
    pub fn scan_by_prefix_at(&self, key: &str, prefix: &str, timestamp: Timestamp) -> Vec<String> {
        self.inner.render_fields(key, prefix, Some(timestamp))
    }

    // ===== Maintenance =====

    /// Whether a record exists for `key`, even if all its fields were deleted.
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.records.contains_key(key)
    }

    /// Number of records held, empty ones included.
    pub fn record_count(&self) -> usize {
        self.inner.records.len()
    }

    /// Number of fields held across all records, expired ones included.
    pub fn field_count(&self) -> usize {
        self.inner.stats.field_count
    }

    /// All record keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.records.keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    /// Physically remove every entry that is no longer visible at `timestamp`.
    ///
    /// This never runs on its own. Entries with `timestamp <= expiry` are
    /// left untouched, so timed reads at or after `timestamp` see the same
    /// state before and after the purge.
    pub fn purge_expired_at(&mut self, timestamp: Timestamp) -> PurgeStats {
        self.inner.purge_expired(timestamp)
    }

    /// Remove every record. Statistics keep accumulating.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Set and delete events recorded for a field, oldest first.
    ///
    /// History outlives the field: deleting, purging, or pruning the record
    /// leaves its events in place (each field stays bounded by
    /// `Config::history_capacity`). Only [`clear`](Self::clear) drops it.
    ///
    /// Returns `None` when history tracking is disabled or the field has no
    /// recorded events.
    #[cfg(feature = "time-index")]
    pub fn history(&self, key: &str, field: &str) -> Option<Vec<HistoryEntry>> {
        self.inner
            .history
            .as_ref()
            .and_then(|history| history.history_for(key, field))
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TemporalStore for RecordStore {
    fn set(&mut self, key: &str, field: &str, value: &str) {
        RecordStore::set(self, key, field, value)
    }

    fn get(&self, key: &str, field: &str) -> Option<String> {
        RecordStore::get(self, key, field)
    }

    fn delete(&mut self, key: &str, field: &str) -> bool {
        RecordStore::delete(self, key, field)
    }

    fn scan(&self, key: &str) -> Vec<String> {
        RecordStore::scan(self, key)
    }

    fn scan_by_prefix(&self, key: &str, prefix: &str) -> Vec<String> {
        RecordStore::scan_by_prefix(self, key, prefix)
    }

    fn set_at(&mut self, key: &str, field: &str, value: &str, timestamp: Timestamp) {
        RecordStore::set_at(self, key, field, value, timestamp)
    }

    fn set_at_with_ttl(
        &mut self,
        key: &str,
        field: &str,
        value: &str,
        timestamp: Timestamp,
        ttl: i64,
    ) {
        RecordStore::set_at_with_ttl(self, key, field, value, timestamp, ttl)
    }

    fn delete_at(&mut self, key: &str, field: &str, timestamp: Timestamp) -> bool {
        RecordStore::delete_at(self, key, field, timestamp)
    }

    fn get_at(&self, key: &str, field: &str, timestamp: Timestamp) -> Option<String> {
        RecordStore::get_at(self, key, field, timestamp)
    }

    fn scan_at(&self, key: &str, timestamp: Timestamp) -> Vec<String> {
        RecordStore::scan_at(self, key, timestamp)
    }

    fn scan_by_prefix_at(&self, key: &str, prefix: &str, timestamp: Timestamp) -> Vec<String> {
        RecordStore::scan_by_prefix_at(self, key, prefix, timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(feature = "time-index")]
    use crate::types::HistoryEventKind;

    fn alice() -> RecordStore {
        let mut store = RecordStore::new();
        store.set("user1", "name", "Alice");
        store.set("user1", "age", "30");
        store.set("user1", "address", "Wonderland");
        store
    }

    #[test]
    fn test_set_get_overwrite() {
        let mut store = RecordStore::new();
        store.set("user1", "name", "Alice");
        store.set("user1", "age", "30");
        assert_eq!(store.get("user1", "name").as_deref(), Some("Alice"));

        store.set("user1", "age", "31");
        assert_eq!(store.get("user1", "age").as_deref(), Some("31"));
        assert_eq!(store.get("user1", "address"), None);
        assert_eq!(store.get("user2", "name"), None);
    }

    #[test]
    fn test_delete_once() {
        let mut store = alice();
        assert!(store.delete("user1", "age"));
        assert_eq!(store.get("user1", "age"), None);
        assert!(!store.delete("user1", "age"));
        assert!(!store.delete("user2", "name"));
    }

    #[test]
    fn test_scan_and_prefix() {
        let store = alice();
        assert_eq!(
            store.scan("user1"),
            vec!["address(Wonderland)", "age(30)", "name(Alice)"]
        );
        assert_eq!(store.scan_by_prefix("user1", "add"), vec!["address(Wonderland)"]);
        assert_eq!(store.scan_by_prefix("user1", "a"), vec!["address(Wonderland)", "age(30)"]);
        assert!(store.scan_by_prefix("user1", "xyz").is_empty());
        assert!(store.scan_by_prefix("user1", "Add").is_empty());
        assert!(store.scan("user2").is_empty());
        assert!(store.scan_by_prefix("user2", "name").is_empty());
    }

    #[test]
    fn test_present_time_reads_ignore_expiry() {
        let mut store = RecordStore::new();
        store.set_at_with_ttl("k", "f", "v", 0, -5);
        assert_eq!(store.get("k", "f").as_deref(), Some("v"));
        assert_eq!(store.scan("k"), vec!["f(v)"]);
        assert_eq!(store.get_at("k", "f", 0), None);
    }

    #[test]
    fn test_timed_operations() {
        let mut store = RecordStore::new();
        store.set_at("user1", "name", "Alice", 1);
        store.set_at("user1", "age", "30", 2);
        store.set_at("user1", "address", "Wonderland", 3);
        store.set_at_with_ttl("user1", "tempField", "tempValue", 4, 2);

        assert_eq!(store.get_at("user1", "name", 1).as_deref(), Some("Alice"));
        assert_eq!(store.get_at("user1", "age", 2).as_deref(), Some("30"));
        assert_eq!(store.get_at("user1", "tempField", 6).as_deref(), Some("tempValue"));
        assert_eq!(store.get_at("user1", "tempField", 7), None);

        assert!(store.delete_at("user1", "age", 2));
        assert_eq!(store.get_at("user1", "age", 3), None);

        assert!(!store.delete_at("user1", "tempField", 8));
        assert_eq!(store.get_at("user1", "tempField", 4), None);

        assert_eq!(
            store.scan_at("user1", 2),
            vec!["address(Wonderland)", "name(Alice)"]
        );
        assert_eq!(
            store.scan_by_prefix_at("user1", "add", 3),
            vec!["address(Wonderland)"]
        );
    }

    #[test]
    fn test_set_at_ignores_timestamp_for_expiry() {
        let mut store = RecordStore::new();
        store.set_at("k", "f", "v", 100);
        assert_eq!(store.get_at("k", "f", Timestamp::MAX).as_deref(), Some("v"));
        assert_eq!(store.get_at("k", "f", -100).as_deref(), Some("v"));
    }

    #[test]
    fn test_overwrite_replaces_expiry() {
        let mut store = RecordStore::new();
        store.set_at_with_ttl("k", "f", "v1", 1, 1);
        store.set("k", "f", "v2");
        assert_eq!(store.get_at("k", "f", 1_000).as_deref(), Some("v2"));

        store.set_at_with_ttl("k", "f", "v3", 10, 5);
        assert_eq!(store.get_at("k", "f", 15).as_deref(), Some("v3"));
        assert_eq!(store.get_at("k", "f", 16), None);
    }

    #[test]
    fn test_delete_at_counts_liveness() {
        let mut store = RecordStore::new();
        store.set_at_with_ttl("k", "live", "1", 0, 10);
        store.set_at_with_ttl("k", "dead", "2", 0, 1);

        assert!(store.delete_at("k", "live", 10));
        assert!(!store.delete_at("k", "dead", 10));
        assert!(!store.delete_at("k", "missing", 10));

        let stats = store.stats();
        assert_eq!(stats.live_deletes, 1);
        assert_eq!(stats.expired_deletes, 1);
        assert_eq!(stats.field_count, 0);
    }

    #[test]
    fn test_emptied_record_is_retained() {
        let mut store = RecordStore::new();
        store.set("k", "f", "v");
        store.delete("k", "f");
        assert!(store.contains_key("k"));
        assert!(store.scan("k").is_empty());
        assert_eq!(store.record_count(), 1);
    }

    #[test]
    fn test_trait_object_dispatch() {
        let mut store: Box<dyn TemporalStore> = Box::new(RecordStore::new());
        store.set_at_with_ttl("k", "f", "v", 1, 2);
        assert_eq!(store.get_at("k", "f", 3).as_deref(), Some("v"));
        assert!(!store.delete_at("k", "f", 4));
        assert!(store.scan("k").is_empty());
    }

    #[test]
    fn test_keys_sorted() {
        let mut store = RecordStore::new();
        store.set("b", "f", "1");
        store.set("a", "f", "1");
        store.set("c", "f", "1");
        assert_eq!(store.keys(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_clear() {
        let mut store = alice();
        store.clear();
        assert_eq!(store.record_count(), 0);
        assert_eq!(store.field_count(), 0);
        assert!(store.scan("user1").is_empty());
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        #[cfg(feature = "time-index")]
        {
            let config = Config {
                history_capacity: Some(0),
                ..Config::default()
            };
            assert!(RecordStore::with_config(config).is_err());
        }
        assert!(RecordStore::with_config(Config::default()).is_ok());
    }

    #[cfg(feature = "time-index")]
    #[test]
    fn test_history_tracking_with_capacity() {
        let config = Config::default().with_history_capacity(2);
        let mut store = RecordStore::with_config(config).unwrap();

        store.set_at("k", "f", "v1", 1);
        store.set_at_with_ttl("k", "f", "v2", 2, 3);
        store.delete_at("k", "f", 9);

        let history = store.history("k", "f").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].kind, HistoryEventKind::Set);
        assert_eq!(history[0].value.as_deref(), Some("v2"));
        assert_eq!(history[0].expiry, Some(5));
        assert_eq!(history[1].kind, HistoryEventKind::Delete);
        assert_eq!(history[1].timestamp, Some(9));
    }

    #[cfg(feature = "time-index")]
    #[test]
    fn test_history_survives_pruned_record_until_clear() {
        let config = Config::default()
            .with_history_capacity(4)
            .with_prune_empty_records(true);
        let mut store = RecordStore::with_config(config).unwrap();

        store.set_at("k", "f", "v", 1);
        assert!(store.delete_at("k", "f", 2));
        assert!(!store.contains_key("k"));

        let history = store.history("k", "f").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].kind, HistoryEventKind::Delete);

        store.clear();
        assert!(store.history("k", "f").is_none());
    }

    #[cfg(feature = "time-index")]
    #[test]
    fn test_history_disabled_by_default() {
        let mut store = RecordStore::new();
        store.set("k", "f", "v");
        assert!(store.history("k", "f").is_none());
    }
}
