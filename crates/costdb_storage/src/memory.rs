//! In-memory storage backend for testing.

use crate::backend::StorageBackend;
use crate::error::StorageResult;
use async_trait::async_trait;
use parking_lot::RwLock;

/// An in-memory storage backend.
///
/// This backend holds its snapshot in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral databases that don't need persistence
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    snapshot: RwLock<Option<Vec<u8>>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory backend with a pre-existing snapshot.
    ///
    /// Useful for testing reopen scenarios.
    #[must_use]
    pub fn with_snapshot(data: Vec<u8>) -> Self {
        Self {
            snapshot: RwLock::new(Some(data)),
        }
    }

    /// Returns a copy of the current snapshot.
    ///
    /// Useful for testing and debugging.
    #[must_use]
    pub fn snapshot(&self) -> Option<Vec<u8>> {
        self.snapshot.read().clone()
    }

    /// Clears the snapshot.
    pub fn clear(&self) {
        *self.snapshot.write() = None;
    }
}

#[async_trait]
impl StorageBackend for InMemoryBackend {
    async fn load(&self) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.snapshot.read().clone())
    }

    async fn persist(&self, data: Vec<u8>) -> StorageResult<()> {
        *self.snapshot.write() = Some(data);
        Ok(())
    }

    async fn sync(&self) -> StorageResult<()> {
        // In-memory snapshots have nothing to sync
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_new_is_empty() {
        let backend = InMemoryBackend::new();
        assert!(backend.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn memory_persist_then_load() {
        let backend = InMemoryBackend::new();
        backend.persist(b"hello world".to_vec()).await.unwrap();

        let data = backend.load().await.unwrap();
        assert_eq!(data.as_deref(), Some(b"hello world".as_slice()));
    }

    #[tokio::test]
    async fn memory_persist_replaces() {
        let backend = InMemoryBackend::new();
        backend.persist(b"first".to_vec()).await.unwrap();
        backend.persist(b"second".to_vec()).await.unwrap();

        let data = backend.load().await.unwrap();
        assert_eq!(data.as_deref(), Some(b"second".as_slice()));
    }

    #[tokio::test]
    async fn memory_with_snapshot() {
        let backend = InMemoryBackend::with_snapshot(b"preloaded".to_vec());
        let data = backend.load().await.unwrap();
        assert_eq!(data.as_deref(), Some(b"preloaded".as_slice()));
    }

    #[tokio::test]
    async fn memory_clear() {
        let backend = InMemoryBackend::new();
        backend.persist(b"some data".to_vec()).await.unwrap();
        backend.clear();
        assert!(backend.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn memory_sync_succeeds() {
        let backend = InMemoryBackend::new();
        backend.persist(b"data".to_vec()).await.unwrap();
        assert!(backend.sync().await.is_ok());
    }
}
