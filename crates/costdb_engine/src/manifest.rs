//! Database manifest for metadata storage.

use crate::error::{EngineError, EngineResult};
use crate::table::TableSpec;
use crate::types::DatabaseVersion;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current manifest format version (major, minor).
pub const FORMAT_VERSION: (u16, u16) = (1, 0);

/// Database manifest containing metadata.
///
/// The manifest stores:
/// - Format version
/// - Database schema version
/// - Table registry (name to key configuration)
///
/// It is encoded as CBOR and rewritten atomically whenever the schema
/// changes (see [`crate::Database`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Format version (major, minor).
    pub format_version: (u16, u16),
    /// Database schema version.
    pub version: DatabaseVersion,
    /// Table name to spec mapping.
    pub tables: BTreeMap<String, TableSpec>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

impl Manifest {
    /// Creates a new empty manifest at version 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            format_version: FORMAT_VERSION,
            version: DatabaseVersion::ZERO,
            tables: BTreeMap::new(),
        }
    }

    /// Checks whether a table is declared.
    #[must_use]
    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Returns a table's spec, if declared.
    #[must_use]
    pub fn table_spec(&self, name: &str) -> Option<&TableSpec> {
        self.tables.get(name)
    }

    /// Inserts a table if not already present.
    ///
    /// Returns `true` if the table was inserted, `false` if a table with
    /// that name already existed (the existing spec is left untouched).
    pub fn insert_table(&mut self, name: &str, spec: TableSpec) -> bool {
        if self.tables.contains_key(name) {
            return false;
        }
        self.tables.insert(name.to_string(), spec);
        true
    }

    /// Removes a table.
    ///
    /// Returns `true` if the table was present.
    pub fn remove_table(&mut self, name: &str) -> bool {
        self.tables.remove(name).is_some()
    }

    /// Encodes the manifest to CBOR bytes.
    pub fn encode(&self) -> EngineResult<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::ser::into_writer(self, &mut buf)
            .map_err(|e| EngineError::encode(e.to_string()))?;
        Ok(buf)
    }

    /// Decodes a manifest from CBOR bytes.
    ///
    /// Rejects manifests written by an incompatible format version.
    pub fn decode(data: &[u8]) -> EngineResult<Self> {
        let manifest: Self = ciborium::de::from_reader(data)
            .map_err(|e| EngineError::decode(e.to_string()))?;

        if manifest.format_version.0 != FORMAT_VERSION.0 {
            return Err(EngineError::invalid_format(format!(
                "incompatible manifest format: found v{}.{}, expected v{}.{}",
                manifest.format_version.0,
                manifest.format_version.1,
                FORMAT_VERSION.0,
                FORMAT_VERSION.1,
            )));
        }

        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_manifest_is_empty() {
        let manifest = Manifest::new();
        assert_eq!(manifest.version, DatabaseVersion::ZERO);
        assert!(manifest.tables.is_empty());
    }

    #[test]
    fn insert_table_is_idempotent() {
        let mut manifest = Manifest::new();

        assert!(manifest.insert_table("costItems", TableSpec::default()));
        assert!(!manifest.insert_table("costItems", TableSpec::default()));
        assert_eq!(manifest.tables.len(), 1);
    }

    #[test]
    fn insert_keeps_existing_spec() {
        let mut manifest = Manifest::new();
        manifest.insert_table("items", TableSpec::default());

        let other = TableSpec {
            key_field: "uid".to_string(),
            auto_increment: false,
        };
        manifest.insert_table("items", other);

        let spec = manifest.table_spec("items").unwrap();
        assert_eq!(spec.key_field, "id");
        assert!(spec.auto_increment);
    }

    #[test]
    fn encode_decode_roundtrip() {
        let mut manifest = Manifest::new();
        manifest.version = DatabaseVersion::new(2);
        manifest.insert_table("costItems", TableSpec::default());
        manifest.insert_table(
            "budgets",
            TableSpec {
                key_field: "id".to_string(),
                auto_increment: true,
            },
        );

        let encoded = manifest.encode().unwrap();
        let decoded = Manifest::decode(&encoded).unwrap();

        assert_eq!(decoded, manifest);
    }

    #[test]
    fn garbage_rejected() {
        assert!(Manifest::decode(b"not a manifest").is_err());
    }

    #[test]
    fn incompatible_format_rejected() {
        let mut manifest = Manifest::new();
        manifest.format_version = (FORMAT_VERSION.0 + 1, 0);

        let encoded = manifest.encode().unwrap();
        let result = Manifest::decode(&encoded);
        assert!(matches!(result, Err(EngineError::InvalidFormat { .. })));
    }

    #[test]
    fn remove_table() {
        let mut manifest = Manifest::new();
        manifest.insert_table("items", TableSpec::default());

        assert!(manifest.remove_table("items"));
        assert!(!manifest.remove_table("items"));
        assert!(!manifest.contains_table("items"));
    }
}
