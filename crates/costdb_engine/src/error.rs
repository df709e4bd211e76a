//! Error types for the CostDB engine.

use crate::types::{DatabaseVersion, RecordKey};
use std::io;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur in CostDB engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] costdb_storage::StorageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Encoding a snapshot or manifest failed.
    #[error("encode error: {message}")]
    Encode {
        /// Description of the failure.
        message: String,
    },

    /// Decoding a snapshot or manifest failed.
    #[error("decode error: {message}")]
    Decode {
        /// Description of the failure.
        message: String,
    },

    /// The requested database version is lower than the stored version.
    #[error("version conflict on database {database}: requested {requested}, stored {stored}")]
    VersionConflict {
        /// Name of the database.
        database: String,
        /// The version the caller asked for.
        requested: DatabaseVersion,
        /// The version currently stored.
        stored: DatabaseVersion,
    },

    /// A transaction scope named a table the database does not have.
    #[error("unknown table: {name}")]
    UnknownTable {
        /// Name of the table.
        name: String,
    },

    /// A request targeted a table outside the transaction's scope.
    #[error("table not in transaction scope: {name}")]
    NotInScope {
        /// Name of the table.
        name: String,
    },

    /// A write request was issued in a read-only transaction.
    #[error("write request in read-only transaction against table {name}")]
    ReadOnly {
        /// Name of the table.
        name: String,
    },

    /// A key constraint was violated.
    #[error("constraint violation: key {key} already exists")]
    KeyExists {
        /// The conflicting key.
        key: RecordKey,
    },

    /// The schema upgrade callback failed.
    #[error("upgrade failed: {message}")]
    UpgradeFailed {
        /// Description of the failure.
        message: String,
    },

    /// The on-disk format is invalid or incompatible.
    #[error("invalid database format: {message}")]
    InvalidFormat {
        /// Description of the format issue.
        message: String,
    },

    /// An argument was rejected before reaching storage.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejection.
        message: String,
    },

    /// Another process holds the database directory lock.
    #[error("database locked: another process has exclusive access")]
    DatabaseLocked,
}

impl EngineError {
    /// Creates an encode error.
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Creates a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates an upgrade failed error.
    pub fn upgrade_failed(message: impl Into<String>) -> Self {
        Self::UpgradeFailed {
            message: message.into(),
        }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an unknown table error.
    pub fn unknown_table(name: impl Into<String>) -> Self {
        Self::UnknownTable { name: name.into() }
    }
}
