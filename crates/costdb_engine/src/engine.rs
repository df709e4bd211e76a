//! Engine: process-wide registry of named, versioned databases.

use crate::database::Database;
use crate::error::{EngineError, EngineResult};
use crate::table::TableSpec;
use crate::types::DatabaseVersion;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// The CostDB engine.
///
/// An `Engine` opens databases by name and keeps one live [`Database`]
/// instance per name for the process lifetime, so every caller contends
/// on the same table locks. On-disk engines root each database in its
/// own directory under `root`; in-memory engines keep everything in the
/// registry.
///
/// # Versioning
///
/// [`open`](Self::open) compares the requested version against the
/// stored version (0 for a fresh database):
///
/// - requested < stored: the open fails with a version conflict
/// - requested > stored: the upgrade callback runs before the open
///   completes, then the new version is recorded
/// - requested == stored: the open returns the live handle untouched
pub struct Engine {
    root: Option<PathBuf>,
    databases: Mutex<HashMap<String, Arc<Database>>>,
}

impl Engine {
    /// Creates an engine whose databases live only in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            root: None,
            databases: Mutex::new(HashMap::new()),
        }
    }

    /// Creates an engine that roots each database under `root`.
    #[must_use]
    pub fn on_disk(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            databases: Mutex::new(HashMap::new()),
        }
    }

    /// Checks whether this engine persists databases to disk.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.root.is_some()
    }

    /// Opens the named database at the given version.
    ///
    /// When the stored version is lower than `version`, the `upgrade`
    /// callback runs synchronously within the open against a
    /// [`SchemaEditor`]; this is the only place tables can be created.
    /// If the callback fails, tables it created are removed again, the
    /// version is left unchanged, and the error propagates.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty or path-like name, or a version
    ///   below 1
    /// - `VersionConflict` when `version` is lower than the stored one
    /// - `DatabaseLocked` when another process owns the directory
    /// - any error the upgrade callback returns
    pub async fn open<F>(
        &self,
        name: &str,
        version: DatabaseVersion,
        upgrade: F,
    ) -> EngineResult<Arc<Database>>
    where
        F: FnOnce(&mut SchemaEditor<'_>) -> EngineResult<()>,
    {
        validate_database_name(name)?;
        if version.as_u32() < 1 {
            return Err(EngineError::invalid_argument(
                "database version must be at least 1",
            ));
        }

        // The registry lock is held for the whole open so concurrent
        // opens of the same database serialize, upgrades included.
        let mut registry = self.databases.lock().await;

        let db = match registry.get(name) {
            Some(db) => Arc::clone(db),
            None => {
                let db = match &self.root {
                    Some(root) => Database::open_on_disk(name, &root.join(name)).await?,
                    None => Database::in_memory(name),
                };
                let db = Arc::new(db);
                registry.insert(name.to_string(), Arc::clone(&db));
                db
            }
        };

        let stored = db.version();
        if version < stored {
            return Err(EngineError::VersionConflict {
                database: name.to_string(),
                requested: version,
                stored,
            });
        }

        if version > stored {
            let mut editor = SchemaEditor {
                db: &db,
                created: Vec::new(),
            };
            if let Err(e) = upgrade(&mut editor) {
                let created = editor.created;
                for table in &created {
                    db.remove_table(table);
                }
                return Err(e);
            }

            db.set_version(version);
            db.save_manifest().await?;
            info!(database = name, %stored, %version, "database upgraded");
        }

        Ok(db)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

/// Schema handle passed to the upgrade callback.
///
/// Exists only for the duration of an upgrade; all schema changes go
/// through it so a failed upgrade can be undone.
pub struct SchemaEditor<'a> {
    db: &'a Database,
    created: Vec<String>,
}

impl SchemaEditor<'_> {
    /// Creates a table if not already declared.
    ///
    /// Re-declaring an existing table is a no-op: its key configuration
    /// is left untouched even when `spec` differs. Upgrades only ever
    /// add missing tables.
    pub fn create_table(&mut self, name: &str, spec: TableSpec) -> EngineResult<()> {
        if self.db.create_table(name, spec)? {
            self.created.push(name.to_string());
        }
        Ok(())
    }

    /// Checks whether a table is declared.
    #[must_use]
    pub fn contains_table(&self, name: &str) -> bool {
        self.db.contains_table(name)
    }

    /// Returns the names of tables created by this upgrade so far.
    #[must_use]
    pub fn created(&self) -> &[String] {
        &self.created
    }
}

/// Rejects database names that cannot double as directory names.
fn validate_database_name(name: &str) -> EngineResult<()> {
    if name.is_empty() {
        return Err(EngineError::invalid_argument(
            "database name must not be empty",
        ));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(EngineError::invalid_argument(format!(
            "database name is not a valid directory name: {name}"
        )));
    }
    Ok(())
}
