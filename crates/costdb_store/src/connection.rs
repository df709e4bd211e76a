//! Connection management: database open and table declaration.

use crate::error::{StoreError, StoreResult};
use costdb_engine::{Database, DatabaseVersion, Engine, TableSpec};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

/// Declaration of a table to create during the upgrade phase.
///
/// Defaults mirror the store's record model: an `"id"` identifier field
/// whose values the engine assigns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDecl {
    /// Table name.
    pub name: String,
    /// Name of the identifier field within records.
    pub key_field: String,
    /// Whether the engine assigns identifiers.
    pub auto_increment: bool,
}

impl TableDecl {
    /// Declares a table keyed by an engine-assigned `"id"` field.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_field: "id".to_string(),
            auto_increment: true,
        }
    }

    /// Overrides the identifier field name.
    #[must_use]
    pub fn key_field(mut self, key_field: impl Into<String>) -> Self {
        self.key_field = key_field.into();
        self
    }

    /// Overrides the auto-increment flag.
    #[must_use]
    pub fn auto_increment(mut self, auto_increment: bool) -> Self {
        self.auto_increment = auto_increment;
        self
    }

    fn spec(&self) -> TableSpec {
        TableSpec {
            key_field: self.key_field.clone(),
            auto_increment: self.auto_increment,
        }
    }
}

/// A live handle to an opened, versioned database.
///
/// Obtained from [`Connection::open`]; cheap to clone and held by the
/// [`crate::Store`] for the process lifetime. Every record operation
/// borrows the underlying database through this handle.
#[derive(Debug, Clone)]
pub struct Connection {
    db: Arc<Database>,
}

impl Connection {
    /// Opens (or creates) the named database at `version`, declaring the
    /// given tables.
    ///
    /// When the stored version is lower than `version`, the upgrade
    /// phase runs within this call and creates every declared table not
    /// already present; existing tables are left untouched. Opening an
    /// already-open database at the same version with the same tables is
    /// idempotent and returns an equivalent handle.
    ///
    /// # Errors
    ///
    /// Fails with [`StoreError::Connection`] when:
    /// - two declarations share a name
    /// - the engine reports an open failure (version conflict, locked
    ///   directory, invalid name, upgrade failure)
    pub async fn open(
        engine: &Engine,
        database: &str,
        version: u32,
        tables: &[TableDecl],
    ) -> StoreResult<Self> {
        let mut seen = HashSet::new();
        for decl in tables {
            if !seen.insert(decl.name.as_str()) {
                return Err(StoreError::connection(format!(
                    "duplicate table declaration: {}",
                    decl.name
                )));
            }
        }

        let db = engine
            .open(database, DatabaseVersion::new(version), |schema| {
                for decl in tables {
                    schema.create_table(&decl.name, decl.spec())?;
                }
                Ok(())
            })
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        info!(database, version, "connection opened");
        Ok(Self { db })
    }

    /// Returns the underlying database handle.
    #[must_use]
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Returns the database name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.db.name()
    }

    /// Returns the stored schema version.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.db.version().as_u32()
    }
}
