//! Storage error types for xhub-storage.
//!
//! [`StorageError`] covers backend faults (SQLite, migrations), rejected
//! identities surfaced from the key codec, and partially applied cascading
//! deletes. Absence of a key is not an error: lookups return `Ok(None)`.

use thiserror::Error;
use xhub_core::CoreError;

/// Result alias used throughout the storage layer.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An SQLite call failed.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Applying schema migrations failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// A backend-specific failure that is not an SQLite error.
    #[error("backend error: {message}")]
    Backend { message: String },

    /// The resource identity was rejected before any key was built.
    #[error(transparent)]
    Identity(#[from] CoreError),

    /// One or more deletes of a cascade failed. Deletes that succeeded stay
    /// applied; `source` is the first failure encountered.
    #[error("cascade delete of {target} failed at '{key}' ({failed} of {attempted} operations failed): {source}")]
    Cascade {
        target: String,
        key: String,
        failed: usize,
        attempted: usize,
        #[source]
        source: Box<StorageError>,
    },
}

impl StorageError {
    pub fn backend(message: impl Into<String>) -> Self {
        StorageError::Backend {
            message: message.into(),
        }
    }

    /// Whether the error is a caller mistake rather than a store fault.
    pub fn is_invalid_identity(&self) -> bool {
        matches!(self, StorageError::Identity(_))
    }
}
