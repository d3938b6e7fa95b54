//! Store builder for flexible configuration
//!
//! This module provides a builder pattern for creating stores with a
//! validated configuration.

use crate::config::Config;
use crate::error::Result;
use crate::store::RecordStore;
#[cfg(feature = "sync")]
use crate::store::SyncStore;

/// Builder for store configuration.
#[derive(Debug, Clone, Default)]
pub struct StoreBuilder {
    config: Config,
}

impl StoreBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Drop records as soon as their last field is removed.
    pub fn prune_empty_records(mut self, prune: bool) -> Self {
        self.config = self.config.with_prune_empty_records(prune);
        self
    }

    /// Enable history tracking with a fixed per-field capacity. A capacity of
    /// zero makes [`build`](Self::build) return `InvalidConfig`.
    #[cfg(feature = "time-index")]
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.config = self.config.with_history_capacity(capacity);
        self
    }

    /// Build the store. Fails if the configuration does not validate.
    pub fn build(self) -> Result<RecordStore> {
        RecordStore::with_config(self.config)
    }

    /// Build a thread-safe store.
    #[cfg(feature = "sync")]
    pub fn build_sync(self) -> Result<SyncStore> {
        SyncStore::with_config(self.config)
    }
}
