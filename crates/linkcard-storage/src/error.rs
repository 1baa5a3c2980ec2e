//! Storage error types for linkcard-storage.
//!
//! [`StorageError`] separates "the record does not exist" from failures to
//! reach or read the store, so callers can report the two differently.

use thiserror::Error;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The singleton record has never been saved.
    #[error("profile record not found")]
    NotFound,

    /// The remote store could not be reached.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote store answered with a non-success status.
    #[error("remote store returned {status}: {body}")]
    Remote { status: u16, body: String },

    /// A SQLite operation failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Applying schema migrations failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The stored record could not be turned into a snapshot.
    #[error("corrupt record: {reason}")]
    Corrupt { reason: String },

    /// The store is offline or its handle is unusable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound)
    }
}
