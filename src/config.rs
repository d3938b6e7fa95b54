//! Store configuration.
//!
//! `Config` is plain serde data so it can be embedded in a host's own
//! configuration file and loaded from JSON (or TOML with the `toml` feature).
use crate::error::{FieldTimeError, Result};

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Drop a record as soon as its last field is deleted or purged.
    /// Off by default: emptied records stay behind and scan as empty.
    #[serde(default)]
    pub prune_empty_records: bool,

    /// Number of history events kept per field. `None` disables tracking.
    #[cfg(feature = "time-index")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_capacity: Option<usize>,
}

impl Config {
    const HISTORY_CAPACITY_WARN_THRESHOLD: usize = 100_000;

    pub fn with_prune_empty_records(mut self, prune: bool) -> Self {
        self.prune_empty_records = prune;
        self
    }

    /// Zero is stored as given and rejected later by [`validate`](Self::validate).
    #[cfg(feature = "time-index")]
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        if capacity > Self::HISTORY_CAPACITY_WARN_THRESHOLD {
            log::warn!(
                "History capacity of {} is very large and may consume significant memory. \
                Each event stores the value and its expiry per field.",
                capacity
            );
        }

        self.history_capacity = Some(capacity);
        self
    }

    pub fn validate(&self) -> Result<()> {
        #[cfg(feature = "time-index")]
        if let Some(capacity) = self.history_capacity
            && capacity == 0
        {
            return Err(FieldTimeError::InvalidConfig(
                "history capacity must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(toml_str).map_err(|e| FieldTimeError::Toml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| FieldTimeError::Toml(e.to_string()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prune_empty_records: false,
            #[cfg(feature = "time-index")]
            history_capacity: None,
        }
    }
}
