//! Internal record mutation and visibility helpers.

#[cfg(feature = "time-index")]
use super::history::HistoryTracker;
use super::{Record, StoreInner};
use crate::config::Config;
use crate::types::{Entry, PurgeStats, StoreStats, Timestamp};
use rustc_hash::FxHashMap;
use std::ops::Bound;

impl StoreInner {
    pub(crate) fn new_with_config(config: &Config) -> Self {
        Self {
            records: FxHashMap::default(),
            stats: StoreStats::default(),
            config: config.clone(),
            #[cfg(feature = "time-index")]
            history: config.history_capacity.map(HistoryTracker::new),
        }
    }

    /// Insert or replace an entry, creating the record on first write.
    ///
    /// `timestamp` is the logical time supplied by the caller, if any. It is
    /// only used for history; the entry's expiry is already fixed.
    pub(crate) fn insert_entry(
        &mut self,
        key: &str,
        field: &str,
        entry: Entry,
        timestamp: Option<Timestamp>,
    ) -> Option<Entry> {
        #[cfg(feature = "time-index")]
        if let Some(history) = self.history.as_mut() {
            history.record_set(key, field, &entry, timestamp);
        }

        log::trace!(
            "set {}.{} expiry={} at={:?}",
            key,
            field,
            entry.expiry,
            timestamp
        );

        let record = self.records.entry(key.to_string()).or_default();

        let old = match record.get_mut(field) {
            Some(slot) => Some(std::mem::replace(slot, entry)),
            None => {
                record.insert(field.to_string(), entry);
                None
            }
        };

        if old.is_none() {
            self.stats.field_count += 1;
        }
        self.stats.record_count = self.records.len();
        self.stats.record_operation();
        old
    }

    /// Physically remove an entry, pruning the record if configured to.
    pub(crate) fn remove_entry(
        &mut self,
        key: &str,
        field: &str,
        timestamp: Option<Timestamp>,
    ) -> Option<Entry> {
        let record = self.records.get_mut(key)?;
        let removed = record.remove(field)?;
        let emptied = record.is_empty();

        #[cfg(feature = "time-index")]
        if let Some(history) = self.history.as_mut() {
            history.record_delete(key, field, &removed, timestamp);
        }

        log::trace!("delete {}.{} at={:?}", key, field, timestamp);

        if emptied {
            self.prune_if_configured(key);
        }

        self.stats.field_count -= 1;
        self.stats.record_count = self.records.len();
        self.stats.record_operation();
        Some(removed)
    }

    fn prune_if_configured(&mut self, key: &str) -> bool {
        if !self.config.prune_empty_records {
            return false;
        }
        let pruned = self.records.remove(key).is_some();
        if pruned {
            log::debug!("pruned empty record {}", key);
        }
        pruned
    }

    pub(crate) fn get_entry(&self, key: &str, field: &str) -> Option<&Entry> {
        self.records.get(key)?.get(field)
    }

    /// Render every field of `key` whose name starts with `prefix`, keeping
    /// only entries visible at `at` when a time is given.
    ///
    /// Output is sorted by the rendered `field(value)` string, which can
    /// differ from field-name order when a name contains bytes below `(`.
    pub(crate) fn render_fields(
        &self,
        key: &str,
        prefix: &str,
        at: Option<Timestamp>,
    ) -> Vec<String> {
        let Some(record) = self.records.get(key) else {
            return Vec::new();
        };

        let mut rendered: Vec<String> = fields_with_prefix(record, prefix)
            .filter(|(_, entry)| at.is_none_or(|t| entry.is_visible_at(t)))
            .map(|(field, entry)| entry.render(field))
            .collect();
        rendered.sort_unstable();
        rendered
    }

    /// Remove every entry that is no longer visible at `timestamp`.
    pub(crate) fn purge_expired(&mut self, timestamp: Timestamp) -> PurgeStats {
        let mut purge = PurgeStats::default();
        let mut emptied = Vec::new();

        for (key, record) in self.records.iter_mut() {
            let before = record.len();

            #[cfg(feature = "time-index")]
            if let Some(history) = self.history.as_mut() {
                for (field, entry) in record.iter() {
                    if entry.is_expired_at(timestamp) {
                        history.record_purge(key, field, entry, timestamp);
                    }
                }
            }

            record.retain(|_, entry| entry.is_visible_at(timestamp));
            let removed = before - record.len();
            purge.fields_removed += removed;

            if removed > 0 && record.is_empty() {
                emptied.push(key.clone());
            }
        }

        for key in emptied {
            if self.prune_if_configured(&key) {
                purge.records_pruned += 1;
            }
        }

        self.stats.field_count -= purge.fields_removed;
        self.stats.record_count = self.records.len();
        self.stats.record_purged(purge.fields_removed as u64);
        self.stats.record_operation();

        log::debug!(
            "purged {} expired fields and {} records at t={}",
            purge.fields_removed,
            purge.records_pruned,
            timestamp
        );
        purge
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
        #[cfg(feature = "time-index")]
        if let Some(history) = self.history.as_mut() {
            history.clear();
        }
        self.stats.field_count = 0;
        self.stats.record_count = 0;
        self.stats.record_operation();
    }
}

fn fields_with_prefix<'a>(
    record: &'a Record,
    prefix: &'a str,
) -> impl Iterator<Item = (&'a String, &'a Entry)> + 'a {
    record
        .range::<str, _>((Bound::Included(prefix), Bound::<&str>::Unbounded))
        .take_while(move |(field, _)| field.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inner(config: Config) -> StoreInner {
        StoreInner::new_with_config(&config)
    }

    #[test]
    fn test_insert_replaces_wholesale() {
        let mut inner = inner(Config::default());
        assert!(inner.insert_entry("k", "f", Entry::with_ttl("v1", 1, 2), Some(1)).is_none());

        let old = inner.insert_entry("k", "f", Entry::new("v2"), None).unwrap();
        assert_eq!(old.expiry, 3);

        let current = inner.get_entry("k", "f").unwrap();
        assert_eq!(current.value, "v2");
        assert!(current.never_expires());
        assert_eq!(inner.stats.field_count, 1);
    }

    #[test]
    fn test_prefix_walk_stops_at_first_mismatch() {
        let mut inner = inner(Config::default());
        for field in ["aa", "ab", "b", "a"] {
            inner.insert_entry("k", field, Entry::new("1"), None);
        }
        let record = inner.records.get("k").unwrap();
        let fields: Vec<&str> = fields_with_prefix(record, "a")
            .map(|(f, _)| f.as_str())
            .collect();
        assert_eq!(fields, vec!["a", "aa", "ab"]);
    }

    #[test]
    fn test_render_sorts_by_rendered_string() {
        let mut inner = inner(Config::default());
        inner.insert_entry("k", "a", Entry::new("x"), None);
        inner.insert_entry("k", "a!", Entry::new("y"), None);

        // '!' sorts before '(' so the longer field name comes first.
        assert_eq!(inner.render_fields("k", "", None), vec!["a!(y)", "a(x)"]);
    }

    #[test]
    fn test_remove_keeps_empty_record_by_default() {
        let mut inner = inner(Config::default());
        inner.insert_entry("k", "f", Entry::new("v"), None);
        assert!(inner.remove_entry("k", "f", None).is_some());
        assert!(inner.records.contains_key("k"));
        assert_eq!(inner.stats.record_count, 1);
        assert_eq!(inner.stats.field_count, 0);
    }

    #[test]
    fn test_remove_prunes_when_configured() {
        let mut inner = inner(Config::default().with_prune_empty_records(true));
        inner.insert_entry("k", "f", Entry::new("v"), None);
        inner.insert_entry("k", "g", Entry::new("v"), None);

        inner.remove_entry("k", "f", None);
        assert!(inner.records.contains_key("k"));
        inner.remove_entry("k", "g", None);
        assert!(!inner.records.contains_key("k"));
        assert_eq!(inner.stats.record_count, 0);
    }

    #[test]
    fn test_purge_removes_only_invisible_entries() {
        let mut inner = inner(Config::default());
        inner.insert_entry("k", "short", Entry::with_ttl("1", 0, 5), Some(0));
        inner.insert_entry("k", "edge", Entry::with_ttl("2", 0, 10), Some(0));
        inner.insert_entry("k", "forever", Entry::new("3"), None);

        let purge = inner.purge_expired(10);
        assert_eq!(purge.fields_removed, 1);
        assert_eq!(purge.records_pruned, 0);
        assert!(inner.get_entry("k", "short").is_none());
        assert!(inner.get_entry("k", "edge").is_some());
        assert_eq!(inner.stats.field_count, 2);
        assert_eq!(inner.stats.purged_count, 1);
    }

    #[test]
    fn test_purge_prunes_emptied_records_when_configured() {
        let mut inner = inner(Config::default().with_prune_empty_records(true));
        inner.insert_entry("gone", "f", Entry::with_ttl("1", 0, 1), Some(0));
        inner.insert_entry("kept", "f", Entry::new("2"), None);

        let purge = inner.purge_expired(5);
        assert_eq!(purge, PurgeStats { fields_removed: 1, records_pruned: 1 });
        assert!(!inner.records.contains_key("gone"));
        assert!(inner.records.contains_key("kept"));
    }
}
