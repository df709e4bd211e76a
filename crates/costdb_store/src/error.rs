//! Error types for the cost store.

use costdb_engine::RecordKey;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in cost store operations.
///
/// The taxonomy is deliberately small:
///
/// - [`Connection`](Self::Connection) is fatal to all subsequent
///   operations until a later open succeeds
/// - [`NotInitialized`](Self::NotInitialized) is a programmer error
///   (operation before a successful open) and is never retried
/// - [`NotFound`](Self::NotFound) is recoverable; the caller decides
///   whether to ignore or report it
/// - [`Operation`](Self::Operation) wraps any underlying engine failure
///
/// The store performs no implicit retries; every failure surfaces to the
/// immediate caller of the failing operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Opening or upgrading the database failed.
    #[error("connection failed: {message}")]
    Connection {
        /// Description of the failure.
        message: String,
    },

    /// An operation was attempted before a successful open.
    #[error("store not initialized: open the connection first")]
    NotInitialized,

    /// An update targeted a record that does not exist.
    #[error("record not found: {key}")]
    NotFound {
        /// The key that was not found.
        key: RecordKey,
    },

    /// An underlying engine request failed.
    #[error("operation failed: {message}")]
    Operation {
        /// Description of the failure.
        message: String,
    },
}

impl StoreError {
    /// Creates a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates an operation error.
    pub fn operation(message: impl Into<String>) -> Self {
        Self::Operation {
            message: message.into(),
        }
    }
}
