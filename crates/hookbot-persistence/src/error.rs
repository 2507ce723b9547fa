//! Error types for session persistence.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing sessions.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Failed to read a file.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write or remove a file.
    #[error("failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored data could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A blocking file task panicked or was cancelled.
    #[error("file task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Result type for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
