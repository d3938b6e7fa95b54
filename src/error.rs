//! Error types for fieldtime.
//!
//! Store operations never fail: a missing key, a missing field, or an expired
//! entry is reported through `None`, `false`, or an empty scan. Errors only
//! surface while loading configuration and constructing a store.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FieldTimeError>;

#[derive(Debug, Error)]
pub enum FieldTimeError {
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(feature = "toml")]
    #[error("toml error: {0}")]
    Toml(String),
}
