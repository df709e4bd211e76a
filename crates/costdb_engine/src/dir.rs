//! Database directory management.
//!
//! This module handles the file system layout for a CostDB database:
//!
//! ```text
//! <root>/<database-name>/
//! ├─ MANIFEST            # Metadata (version, table specs)
//! ├─ LOCK                # Advisory lock for single-process access
//! └─ tables/
//!    └─ <table>.tbl      # One snapshot file per table
//! ```
//!
//! The LOCK file ensures only one process opens a database directory at
//! a time. The MANIFEST file persists the schema across restarts.

use crate::error::{EngineError, EngineResult};
use crate::manifest::Manifest;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const MANIFEST_FILE: &str = "MANIFEST";
const MANIFEST_TEMP: &str = "MANIFEST.tmp";
const LOCK_FILE: &str = "LOCK";
const TABLES_DIR: &str = "tables";

/// Manages the database directory structure and file locking.
///
/// # Thread Safety
///
/// The `DatabaseDir` holds an exclusive advisory lock on the database
/// directory. Only one `DatabaseDir` instance can exist per directory at
/// a time, across processes.
#[derive(Debug)]
pub(crate) struct DatabaseDir {
    /// Root directory path.
    path: PathBuf,
    /// Lock file handle (held for exclusive access).
    _lock_file: File,
}

impl DatabaseDir {
    /// Opens or creates a database directory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path exists but is not a directory
    /// - Another process holds the lock (`DatabaseLocked`)
    /// - I/O errors occur
    pub fn open(path: &Path) -> EngineResult<Self> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(EngineError::invalid_format(format!(
                "path is not a directory: {}",
                path.display()
            )));
        }

        let lock_path = path.join(LOCK_FILE);
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(EngineError::DatabaseLocked);
        }

        fs::create_dir_all(path.join(TABLES_DIR))?;

        Ok(Self {
            path: path.to_path_buf(),
            _lock_file: lock_file,
        })
    }

    /// Returns the path to the database directory.
    #[must_use]
    #[allow(dead_code)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path to the MANIFEST file.
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.path.join(MANIFEST_FILE)
    }

    /// Returns the snapshot path for a table.
    #[must_use]
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.path.join(TABLES_DIR).join(format!("{table}.tbl"))
    }

    /// Loads the manifest from disk.
    ///
    /// Returns `None` if the manifest file doesn't exist (new database).
    pub fn load_manifest(&self) -> EngineResult<Option<Manifest>> {
        let manifest_path = self.manifest_path();

        if !manifest_path.exists() {
            return Ok(None);
        }

        let mut file = File::open(&manifest_path)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;

        if data.is_empty() {
            return Ok(None);
        }

        let manifest = Manifest::decode(&data)?;
        Ok(Some(manifest))
    }

    /// Saves the manifest to disk atomically.
    ///
    /// Uses the write-then-rename pattern for crash safety:
    /// 1. Write to a temporary file and sync it
    /// 2. Rename the temporary file to MANIFEST
    /// 3. Fsync the directory so the rename is durable
    pub fn save_manifest(&self, manifest: &Manifest) -> EngineResult<()> {
        let manifest_path = self.manifest_path();
        let temp_path = self.path.join(MANIFEST_TEMP);

        let data = manifest.encode()?;
        let mut file = File::create(&temp_path)?;
        file.write_all(&data)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &manifest_path)?;
        self.sync_directory()?;

        Ok(())
    }

    #[cfg(unix)]
    fn sync_directory(&self) -> EngineResult<()> {
        // On Unix, fsync on a directory syncs the directory entries
        let dir = File::open(&self.path)?;
        dir.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> EngineResult<()> {
        // Windows NTFS journaling covers metadata durability
        Ok(())
    }
}
