//! File-based storage backend for persistent storage.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::task;

/// A file-based storage backend.
///
/// This backend stores its snapshot in a single file. Data survives
/// process restarts.
///
/// # Durability
///
/// `persist` uses the write-then-rename pattern for crash safety:
/// 1. Write the snapshot to a temporary sibling file
/// 2. Sync the temporary file to disk
/// 3. Rename it over the snapshot file
/// 4. Fsync the parent directory so the rename itself is durable
///
/// A crash at any point leaves either the old snapshot or the new one.
///
/// # Blocking I/O
///
/// All file operations run on the tokio blocking pool via
/// `spawn_blocking`, so callers never block the async runtime.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Creates a file backend for the given snapshot path.
    ///
    /// The file is not created until the first `persist`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    #[cfg(unix)]
    fn sync_parent(path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            // On Unix, fsync on a directory syncs its entries
            let dir = File::open(parent)?;
            dir.sync_all()?;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_parent(_path: &Path) -> StorageResult<()> {
        // Windows NTFS journaling covers metadata durability
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FileBackend {
    async fn load(&self) -> StorageResult<Option<Vec<u8>>> {
        let path = self.path.clone();
        task::spawn_blocking(move || -> StorageResult<Option<Vec<u8>>> {
            if !path.exists() {
                return Ok(None);
            }
            let data = fs::read(&path)?;
            if data.is_empty() {
                return Ok(None);
            }
            Ok(Some(data))
        })
        .await
        .map_err(|e| StorageError::background(e.to_string()))?
    }

    async fn persist(&self, data: Vec<u8>) -> StorageResult<()> {
        let path = self.path.clone();
        task::spawn_blocking(move || -> StorageResult<()> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }

            let temp = Self::temp_path(&path);
            let mut file = File::create(&temp)?;
            file.write_all(&data)?;
            file.sync_all()?;
            drop(file);

            fs::rename(&temp, &path)?;
            Self::sync_parent(&path)?;
            Ok(())
        })
        .await
        .map_err(|e| StorageError::background(e.to_string()))?
    }

    async fn sync(&self) -> StorageResult<()> {
        let path = self.path.clone();
        task::spawn_blocking(move || -> StorageResult<()> {
            if path.exists() {
                let file = File::open(&path)?;
                file.sync_all()?;
            }
            Ok(())
        })
        .await
        .map_err(|e| StorageError::background(e.to_string()))?
    }
}
