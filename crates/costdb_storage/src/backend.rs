//! Storage backend trait definition.

use crate::error::StorageResult;
use async_trait::async_trait;

/// A low-level snapshot store for CostDB.
///
/// Storage backends are **opaque snapshot stores**. Each backend holds at
/// most one blob; `persist` replaces it atomically and `load` returns the
/// last persisted blob. CostDB owns all format interpretation - backends
/// do not understand manifests, tables, or records.
///
/// # Invariants
///
/// - `load` returns exactly the bytes most recently persisted, or `None`
///   if nothing was ever persisted
/// - `persist` replaces the snapshot atomically: a crash mid-persist must
///   leave either the old snapshot or the new one, never a mix
/// - `sync` ensures the last persisted snapshot is durable
/// - Backends must be `Send + Sync` for concurrent access
///
/// All methods are async so callers never block the runtime; file-backed
/// implementations run their blocking I/O via `spawn_blocking`.
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing and ephemeral databases
/// - [`super::FileBackend`] - For persistent storage
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Loads the current snapshot.
    ///
    /// Returns `None` when the backend holds no snapshot (never
    /// persisted, or the file does not exist yet).
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    async fn load(&self) -> StorageResult<Option<Vec<u8>>>;

    /// Replaces the snapshot with `data`.
    ///
    /// The replacement is atomic with respect to crashes: after this
    /// returns, `load` yields `data`; a crash during the call leaves the
    /// previous snapshot intact.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    async fn persist(&self, data: Vec<u8>) -> StorageResult<()>;

    /// Syncs the snapshot to durable storage.
    ///
    /// After this returns successfully, the last persisted snapshot is
    /// guaranteed to survive process termination.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    async fn sync(&self) -> StorageResult<()>;
}
