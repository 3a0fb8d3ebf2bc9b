//! # Cart Engine Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io::Error / unavailable backend                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StorageError (this module)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CartEngine: logged with tracing, swallowed                            │
//! │  (the in-memory cart stays authoritative for the session)              │
//! │                                                                         │
//! │  ConfigError: returned from CartConfig::load, or logged and replaced   │
//! │  by defaults in CartConfig::load_or_default                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use storefront_core::ValidationError;

/// Key-value storage failures.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    ///
    /// ## When This Occurs
    /// - Disk full / quota exceeded
    /// - Permission denied on the data directory
    #[error("Storage I/O failed for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The backend refuses all access (e.g., storage disabled).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// The key cannot be used with this backend.
    #[error("Invalid storage key: {0}")]
    InvalidKey(#[from] ValidationError),
}

impl StorageError {
    /// Wraps an I/O error with the key it happened on.
    pub fn io(key: impl Into<String>, source: std::io::Error) -> Self {
        StorageError::Io {
            key: key.into(),
            source,
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
