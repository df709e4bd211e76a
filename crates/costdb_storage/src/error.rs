//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A background I/O task did not complete.
    #[error("background I/O task failed: {0}")]
    Background(String),
}

impl StorageError {
    /// Creates a background task error.
    pub fn background(message: impl Into<String>) -> Self {
        Self::Background(message.into())
    }
}
