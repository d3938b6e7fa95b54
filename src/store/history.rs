//! Bounded per-field mutation history.

use crate::types::{Entry, HistoryEntry, HistoryEventKind, Timestamp};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

#[derive(Debug)]
pub(crate) struct HistoryTracker {
    capacity: usize,
    entries: FxHashMap<String, FxHashMap<String, VecDeque<HistoryEntry>>>,
}

impl HistoryTracker {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: FxHashMap::default(),
        }
    }

    fn push(&mut self, key: &str, field: &str, event: HistoryEntry) {
        let capacity = self.capacity;
        let deque = self
            .entries
            .entry(key.to_string())
            .or_default()
            .entry(field.to_string())
            .or_default();
        deque.push_back(event);
        while deque.len() > capacity {
            deque.pop_front();
        }
    }

    pub(crate) fn record_set(
        &mut self,
        key: &str,
        field: &str,
        entry: &Entry,
        timestamp: Option<Timestamp>,
    ) {
        self.push(
            key,
            field,
            HistoryEntry {
                timestamp,
                kind: HistoryEventKind::Set,
                value: Some(entry.value.clone()),
                expiry: Some(entry.expiry),
            },
        );
    }

    pub(crate) fn record_delete(
        &mut self,
        key: &str,
        field: &str,
        removed: &Entry,
        timestamp: Option<Timestamp>,
    ) {
        self.push(
            key,
            field,
            HistoryEntry {
                timestamp,
                kind: HistoryEventKind::Delete,
                value: Some(removed.value.clone()),
                expiry: Some(removed.expiry),
            },
        );
    }

    pub(crate) fn record_purge(
        &mut self,
        key: &str,
        field: &str,
        removed: &Entry,
        timestamp: Timestamp,
    ) {
        self.push(
            key,
            field,
            HistoryEntry {
                timestamp: Some(timestamp),
                kind: HistoryEventKind::Purge,
                value: Some(removed.value.clone()),
                expiry: Some(removed.expiry),
            },
        );
    }

    pub(crate) fn history_for(&self, key: &str, field: &str) -> Option<Vec<HistoryEntry>> {
        self.entries
            .get(key)
            .and_then(|fields| fields.get(field))
            .map(|deque| deque.iter().cloned().collect())
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
