//! Database facade: schema registry and transaction entry point.

use crate::dir::DatabaseDir;
use crate::error::{EngineError, EngineResult};
use crate::manifest::Manifest;
use crate::table::{Table, TableSpec};
use crate::transaction::{Transaction, TransactionMode};
use crate::types::DatabaseVersion;
use costdb_storage::{FileBackend, InMemoryBackend, StorageBackend};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::task;

/// Maps a blocking-pool join failure onto an engine error.
pub(crate) fn background(e: task::JoinError) -> EngineError {
    EngineError::Io(std::io::Error::other(e.to_string()))
}

/// A named, versioned database.
///
/// A `Database` owns its manifest (schema version plus table registry)
/// and its live tables. It is obtained from [`crate::Engine::open`] and
/// shared process-wide behind an `Arc`; the engine's registry guarantees
/// one live instance per database name, so all connections contend on
/// the same table locks.
///
/// Databases are never explicitly closed. On-disk state is persisted as
/// transactions commit and as the schema changes; the directory lock is
/// released when the last handle drops.
pub struct Database {
    name: String,
    dir: Option<Arc<DatabaseDir>>,
    manifest: RwLock<Manifest>,
    tables: RwLock<HashMap<String, Arc<Table>>>,
}

impl Database {
    /// Creates a fresh in-memory database at version 0.
    pub(crate) fn in_memory(name: &str) -> Self {
        Self {
            name: name.to_string(),
            dir: None,
            manifest: RwLock::new(Manifest::new()),
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Opens a database directory, loading the manifest and all tables.
    ///
    /// A directory with no manifest is a fresh database at version 0.
    pub(crate) async fn open_on_disk(name: &str, path: &Path) -> EngineResult<Self> {
        let path = path.to_path_buf();
        let (dir, manifest) = task::spawn_blocking(
            move || -> EngineResult<(DatabaseDir, Option<Manifest>)> {
                let dir = DatabaseDir::open(&path)?;
                let manifest = dir.load_manifest()?;
                Ok((dir, manifest))
            },
        )
        .await
        .map_err(background)??;

        let dir = Arc::new(dir);
        let manifest = manifest.unwrap_or_default();

        let mut tables = HashMap::new();
        for (table_name, spec) in &manifest.tables {
            let backend: Arc<dyn StorageBackend> =
                Arc::new(FileBackend::new(dir.table_path(table_name)));
            let table = Table::load(table_name, spec.clone(), backend).await?;
            tables.insert(table_name.clone(), Arc::new(table));
        }

        Ok(Self {
            name: name.to_string(),
            dir: Some(dir),
            manifest: RwLock::new(manifest),
            tables: RwLock::new(tables),
        })
    }

    /// Returns the database name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current schema version.
    #[must_use]
    pub fn version(&self) -> DatabaseVersion {
        self.manifest.read().version
    }

    /// Returns the declared table names, in ascending order.
    #[must_use]
    pub fn table_names(&self) -> Vec<String> {
        self.manifest.read().tables.keys().cloned().collect()
    }

    /// Checks whether a table is declared.
    #[must_use]
    pub fn contains_table(&self, name: &str) -> bool {
        self.manifest.read().contains_table(name)
    }

    /// Checks whether this database persists to disk.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.dir.is_some()
    }

    /// Begins a transaction scoped to the given tables.
    ///
    /// Suspends until the table guards are acquired. The scope must name
    /// at least one declared table.
    pub async fn begin(
        &self,
        tables: &[&str],
        mode: TransactionMode,
    ) -> EngineResult<Transaction> {
        if tables.is_empty() {
            return Err(EngineError::invalid_argument(
                "transaction scope must name at least one table",
            ));
        }

        let resolved = {
            let registry = self.tables.read();
            let mut resolved = Vec::with_capacity(tables.len());
            for name in tables {
                let table = registry
                    .get(*name)
                    .ok_or_else(|| EngineError::unknown_table(*name))?;
                resolved.push(Arc::clone(table));
            }
            resolved
        };

        Ok(Transaction::begin(resolved, mode).await)
    }

    /// Creates a table if not already declared.
    ///
    /// Returns `true` when the table was created. Re-declaring an
    /// existing table is a no-op that leaves its key configuration
    /// untouched, whatever the new spec says.
    pub(crate) fn create_table(&self, name: &str, spec: TableSpec) -> EngineResult<bool> {
        validate_table_name(name)?;

        let mut manifest = self.manifest.write();
        if !manifest.insert_table(name, spec.clone()) {
            return Ok(false);
        }

        let table = Table::create(name, spec, self.backend_for(name));
        self.tables.write().insert(name.to_string(), Arc::new(table));
        Ok(true)
    }

    /// Removes a table created during a failed upgrade.
    pub(crate) fn remove_table(&self, name: &str) {
        self.manifest.write().remove_table(name);
        self.tables.write().remove(name);
    }

    /// Sets the schema version.
    pub(crate) fn set_version(&self, version: DatabaseVersion) {
        self.manifest.write().version = version;
    }

    /// Persists the manifest for on-disk databases.
    pub(crate) async fn save_manifest(&self) -> EngineResult<()> {
        let Some(dir) = self.dir.clone() else {
            return Ok(());
        };
        let manifest = self.manifest.read().clone();

        task::spawn_blocking(move || dir.save_manifest(&manifest))
            .await
            .map_err(background)?
    }

    fn backend_for(&self, table: &str) -> Arc<dyn StorageBackend> {
        match &self.dir {
            Some(dir) => Arc::new(FileBackend::new(dir.table_path(table))),
            None => Arc::new(InMemoryBackend::new()),
        }
    }
}

/// Rejects table names that cannot double as snapshot file names.
fn validate_table_name(name: &str) -> EngineResult<()> {
    if name.is_empty() {
        return Err(EngineError::invalid_argument("table name must not be empty"));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(EngineError::invalid_argument(format!(
            "table name is not a valid file name: {name}"
        )));
    }
    Ok(())
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("name", &self.name)
            .field("version", &self.version())
            .field("tables", &self.table_names())
            .field("persistent", &self.is_persistent())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecordKey;
    use tempfile::tempdir;

    #[tokio::test]
    async fn create_table_is_idempotent() {
        let db = Database::in_memory("test");

        assert!(db.create_table("items", TableSpec::default()).unwrap());
        assert!(!db.create_table("items", TableSpec::default()).unwrap());
        assert_eq!(db.table_names(), vec!["items".to_string()]);
    }

    #[tokio::test]
    async fn invalid_table_names_rejected() {
        let db = Database::in_memory("test");

        assert!(db.create_table("", TableSpec::default()).is_err());
        assert!(db.create_table("a/b", TableSpec::default()).is_err());
        assert!(db.create_table("..", TableSpec::default()).is_err());
    }

    #[tokio::test]
    async fn begin_rejects_unknown_table() {
        let db = Database::in_memory("test");
        db.create_table("items", TableSpec::default()).unwrap();

        let result = db.begin(&["budgets"], TransactionMode::ReadOnly).await;
        assert!(matches!(result, Err(EngineError::UnknownTable { .. })));
    }

    #[tokio::test]
    async fn begin_rejects_empty_scope() {
        let db = Database::in_memory("test");

        let result = db.begin(&[], TransactionMode::ReadOnly).await;
        assert!(matches!(result, Err(EngineError::InvalidArgument { .. })));
    }

    #[tokio::test]
    async fn write_roundtrip_through_begin() {
        let db = Database::in_memory("test");
        db.create_table("items", TableSpec::default()).unwrap();

        let mut txn = db.begin(&["items"], TransactionMode::ReadWrite).await.unwrap();
        let key = txn.add("items", vec![1, 2]).await.unwrap();
        txn.commit().await.unwrap();

        let txn = db.begin(&["items"], TransactionMode::ReadOnly).await.unwrap();
        assert_eq!(txn.get("items", key).await.unwrap(), Some(vec![1, 2]));
    }

    #[tokio::test]
    async fn on_disk_database_round_trips() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("expenses");

        let key;
        {
            let db = Database::open_on_disk("expenses", &path).await.unwrap();
            db.create_table("items", TableSpec::default()).unwrap();
            db.set_version(DatabaseVersion::new(1));
            db.save_manifest().await.unwrap();

            let mut txn = db.begin(&["items"], TransactionMode::ReadWrite).await.unwrap();
            key = txn.add("items", vec![7, 7]).await.unwrap();
            txn.commit().await.unwrap();
        }

        let db = Database::open_on_disk("expenses", &path).await.unwrap();
        assert_eq!(db.version(), DatabaseVersion::new(1));
        assert!(db.contains_table("items"));

        let txn = db.begin(&["items"], TransactionMode::ReadOnly).await.unwrap();
        assert_eq!(txn.get("items", key).await.unwrap(), Some(vec![7, 7]));
    }

    #[tokio::test]
    async fn key_generator_continues_across_reopen() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("expenses");

        {
            let db = Database::open_on_disk("expenses", &path).await.unwrap();
            db.create_table("items", TableSpec::default()).unwrap();
            db.save_manifest().await.unwrap();

            let mut txn = db.begin(&["items"], TransactionMode::ReadWrite).await.unwrap();
            txn.add("items", vec![1]).await.unwrap();
            txn.commit().await.unwrap();
        }

        let db = Database::open_on_disk("expenses", &path).await.unwrap();
        let mut txn = db.begin(&["items"], TransactionMode::ReadWrite).await.unwrap();
        let key = txn.add("items", vec![2]).await.unwrap();
        txn.commit().await.unwrap();

        assert_eq!(key, RecordKey::new(2));
    }

    #[tokio::test]
    async fn remove_table_undoes_creation() {
        let db = Database::in_memory("test");
        db.create_table("items", TableSpec::default()).unwrap();

        db.remove_table("items");
        assert!(!db.contains_table("items"));
        assert!(db
            .begin(&["items"], TransactionMode::ReadOnly)
            .await
            .is_err());
    }
}
