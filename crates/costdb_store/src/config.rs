//! Store configuration.

use crate::connection::TableDecl;

/// Configuration for opening a cost store.
///
/// Built once at startup and handed to [`crate::Store::new`]:
///
/// ```rust
/// use costdb_store::{StoreConfig, TableDecl};
///
/// let config = StoreConfig::new("CostManagerDB")
///     .version(1)
///     .table(TableDecl::new("costItems"));
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Name of the database to open.
    pub database: String,

    /// Schema version to request (must be at least 1).
    pub version: u32,

    /// Tables to declare during the upgrade phase.
    pub tables: Vec<TableDecl>,
}

impl StoreConfig {
    /// Creates a configuration for the named database at version 1 with
    /// no tables declared.
    #[must_use]
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            version: 1,
            tables: Vec::new(),
        }
    }

    /// Sets the schema version to request.
    #[must_use]
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Adds a table declaration.
    #[must_use]
    pub fn table(mut self, decl: TableDecl) -> Self {
        self.tables.push(decl);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_version_one() {
        let config = StoreConfig::new("CostManagerDB");
        assert_eq!(config.database, "CostManagerDB");
        assert_eq!(config.version, 1);
        assert!(config.tables.is_empty());
    }

    #[test]
    fn builder_collects_tables() {
        let config = StoreConfig::new("CostManagerDB")
            .version(2)
            .table(TableDecl::new("costItems"))
            .table(TableDecl::new("budgets"));

        assert_eq!(config.version, 2);
        assert_eq!(config.tables.len(), 2);
        assert_eq!(config.tables[0].name, "costItems");
    }
}
