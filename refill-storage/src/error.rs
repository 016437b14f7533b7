//! Error types for storage backends.

use thiserror::Error;

/// Result type alias for backend operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors a storage backend can report.
///
/// These never reach callers of [`crate::KeyValueStore`]; the facade logs
/// them and degrades to "absent".
#[derive(Debug, Error)]
pub enum StorageError {
    /// The underlying medium failed (I/O, SQL, ...).
    #[error("backend error: {0}")]
    Backend(String),

    /// A lock guarding the medium was poisoned by a panicking holder.
    #[error("storage lock poisoned")]
    Poisoned,

    /// A blocking storage task could not be joined.
    #[error("storage task failed: {0}")]
    Task(String),

    /// A value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    /// Get a machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::Backend(_) => "BACKEND_ERROR",
            StorageError::Poisoned => "LOCK_POISONED",
            StorageError::Task(_) => "TASK_ERROR",
            StorageError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::Backend(e.to_string())
    }
}

impl From<tokio::task::JoinError> for StorageError {
    fn from(e: tokio::task::JoinError) -> Self {
        StorageError::Task(e.to_string())
    }
}
