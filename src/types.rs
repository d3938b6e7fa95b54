//! Core value types for fieldtime.
//!
//! Time in fieldtime is logical: every timestamp is an `i64` supplied by the
//! caller. The store never reads a clock and never checks that timestamps are
//! monotonic across calls.
use serde::{Deserialize, Serialize};

/// A caller-supplied logical instant.
pub type Timestamp = i64;

/// Expiry carried by entries written without a TTL.
pub const NEVER_EXPIRES: Timestamp = Timestamp::MAX;

/// A single field value together with the last instant at which it is visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub value: String,
    /// Inclusive: the entry is visible at `expiry` and hidden at `expiry + 1`.
    pub expiry: Timestamp,
}

impl Entry {
    /// Create an entry that never expires.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expiry: NEVER_EXPIRES,
        }
    }

    /// Create an entry written at `timestamp` that lives for `ttl` ticks.
    ///
    /// The sum saturates, so extreme inputs clamp to the ends of the
    /// timestamp range instead of wrapping. A zero or negative `ttl` is
    /// accepted and yields an entry that is already (or about to be) expired.
    pub fn with_ttl(value: impl Into<String>, timestamp: Timestamp, ttl: i64) -> Self {
        Self {
            value: value.into(),
            expiry: timestamp.saturating_add(ttl),
        }
    }

    #[inline]
    pub fn is_visible_at(&self, timestamp: Timestamp) -> bool {
        timestamp <= self.expiry
    }

    #[inline]
    pub fn is_expired_at(&self, timestamp: Timestamp) -> bool {
        !self.is_visible_at(timestamp)
    }

    pub fn never_expires(&self) -> bool {
        self.expiry == NEVER_EXPIRES
    }

    /// Render as `field(value)`, the format used by every scan.
    pub(crate) fn render(&self, field: &str) -> String {
        let mut out = String::with_capacity(field.len() + self.value.len() + 2);
        out.push_str(field);
        out.push('(');
        out.push_str(&self.value);
        out.push(')');
        out
    }
}

/// Store statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Total number of mutating operations performed
    pub operations_count: u64,
    /// Deletes that removed an entry which was still visible
    pub live_deletes: u64,
    /// Deletes that removed an entry which had already expired
    pub expired_deletes: u64,
    /// Entries physically removed by `purge_expired_at`
    pub purged_count: u64,
    /// Records currently held, empty ones included
    pub record_count: usize,
    /// Fields currently held, expired ones included
    pub field_count: usize,
}

impl StoreStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_operation(&mut self) {
        self.operations_count += 1;
    }

    pub fn record_delete(&mut self, was_live: bool) {
        if was_live {
            self.live_deletes += 1;
        } else {
            self.expired_deletes += 1;
        }
    }

    pub fn record_purged(&mut self, count: u64) {
        self.purged_count += count;
    }
}

/// Outcome of a `purge_expired_at` pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeStats {
    /// Expired entries physically removed
    pub fields_removed: usize,
    /// Records dropped because the purge emptied them (only with pruning enabled)
    pub records_pruned: usize,
}

/// Operation types captured in history tracking.
#[cfg(feature = "time-index")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryEventKind {
    Set,
    Delete,
    Purge,
}

/// Historical record for field mutations.
#[cfg(feature = "time-index")]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Logical time passed to the operation; `None` for present-time calls
    pub timestamp: Option<Timestamp>,
    pub kind: HistoryEventKind,
    /// Value written, or the value that was removed
    pub value: Option<String>,
    pub expiry: Option<Timestamp>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_without_ttl_never_expires() {
        let entry = Entry::new("Alice");
        assert!(entry.never_expires());
        assert!(entry.is_visible_at(Timestamp::MAX));
        assert!(entry.is_visible_at(Timestamp::MIN));
    }

    #[test]
    fn test_ttl_boundary_is_inclusive() {
        let entry = Entry::with_ttl("x", 4, 2);
        assert_eq!(entry.expiry, 6);
        assert!(entry.is_visible_at(6));
        assert!(entry.is_expired_at(7));
    }

    #[test]
    fn test_negative_ttl_is_accepted() {
        let entry = Entry::with_ttl("x", 10, -3);
        assert_eq!(entry.expiry, 7);
        assert!(entry.is_visible_at(7));
        assert!(entry.is_expired_at(10));
    }

    #[test]
    fn test_ttl_saturates() {
        assert_eq!(Entry::with_ttl("x", Timestamp::MAX - 1, 10).expiry, Timestamp::MAX);
        assert_eq!(Entry::with_ttl("x", Timestamp::MIN + 1, -10).expiry, Timestamp::MIN);
    }

    #[test]
    fn test_render_does_not_escape() {
        let entry = Entry::new("a(b)c");
        assert_eq!(entry.render("f"), "f(a(b)c)");
    }

    #[test]
    fn test_stats_counters() {
        let mut stats = StoreStats::new();
        stats.record_operation();
        stats.record_delete(true);
        stats.record_delete(false);
        stats.record_purged(3);

        assert_eq!(stats.operations_count, 1);
        assert_eq!(stats.live_deletes, 1);
        assert_eq!(stats.expired_deletes, 1);
        assert_eq!(stats.purged_count, 3);
    }
}
