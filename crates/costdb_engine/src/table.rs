//! Tables (object stores) and their snapshots.

use crate::error::{EngineError, EngineResult};
use crate::types::RecordKey;
use costdb_storage::StorageBackend;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Key configuration of a table.
///
/// Mirrors the declaration a caller supplies when opening a database:
/// the identifier field name and whether the engine assigns keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    /// Name of the identifier field within records.
    pub key_field: String,
    /// Whether the engine assigns keys from the table's generator.
    pub auto_increment: bool,
}

impl Default for TableSpec {
    fn default() -> Self {
        Self {
            key_field: "id".to_string(),
            auto_increment: true,
        }
    }
}

/// In-memory contents of a table: rows plus the key generator.
///
/// The row map is ordered by key, which is the engine's storage order
/// for `get_all` and cursors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct TableData {
    /// Rows keyed by record key.
    pub rows: BTreeMap<RecordKey, Vec<u8>>,
    /// Next key the generator will assign.
    pub next_key: RecordKey,
}

impl Default for TableData {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_key: RecordKey::new(1),
        }
    }
}

impl TableData {
    /// Assigns the next key and advances the generator.
    ///
    /// The generator is never rewound, so assigned keys are unique for
    /// the table's lifetime even when the assigning transaction aborts.
    pub fn assign_key(&mut self) -> RecordKey {
        let key = self.next_key;
        self.next_key = self.next_key.next();
        key
    }

    /// Encodes the table contents to CBOR bytes.
    pub fn encode(&self) -> EngineResult<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::ser::into_writer(self, &mut buf)
            .map_err(|e| EngineError::encode(e.to_string()))?;
        Ok(buf)
    }

    /// Decodes table contents from CBOR bytes.
    pub fn decode(data: &[u8]) -> EngineResult<Self> {
        ciborium::de::from_reader(data).map_err(|e| EngineError::decode(e.to_string()))
    }
}

/// A table within a database.
///
/// The contents sit behind a `tokio::sync::RwLock`; transactions acquire
/// owned read or write guards for their whole lifetime, which is what
/// serializes overlapping read-write transactions and lets readers run
/// concurrently (see [`crate::Transaction`]).
pub(crate) struct Table {
    name: String,
    spec: TableSpec,
    data: Arc<RwLock<TableData>>,
    backend: Arc<dyn StorageBackend>,
}

impl Table {
    /// Creates a fresh, empty table.
    pub fn create(name: &str, spec: TableSpec, backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            name: name.to_string(),
            spec,
            data: Arc::new(RwLock::new(TableData::default())),
            backend,
        }
    }

    /// Loads a table from its backend snapshot.
    ///
    /// A missing snapshot yields a fresh table (nothing was ever
    /// committed to it).
    pub async fn load(
        name: &str,
        spec: TableSpec,
        backend: Arc<dyn StorageBackend>,
    ) -> EngineResult<Self> {
        let data = match backend.load().await? {
            Some(bytes) => TableData::decode(&bytes)?,
            None => TableData::default(),
        };

        Ok(Self {
            name: name.to_string(),
            spec,
            data: Arc::new(RwLock::new(data)),
            backend,
        })
    }

    /// Returns the table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the table's key configuration.
    #[allow(dead_code)]
    pub fn spec(&self) -> &TableSpec {
        &self.spec
    }

    /// Returns a handle to the table contents for guard acquisition.
    pub fn data(&self) -> Arc<RwLock<TableData>> {
        Arc::clone(&self.data)
    }

    /// Persists the given contents as the table's snapshot.
    ///
    /// Called by committing transactions while they still hold the
    /// table's write guard, so no concurrent persist can interleave.
    pub async fn persist(&self, data: &TableData) -> EngineResult<()> {
        let bytes = data.encode()?;
        self.backend.persist(bytes).await?;
        Ok(())
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use costdb_storage::InMemoryBackend;

    #[test]
    fn default_spec_is_auto_increment_id() {
        let spec = TableSpec::default();
        assert_eq!(spec.key_field, "id");
        assert!(spec.auto_increment);
    }

    #[test]
    fn assign_key_starts_at_one() {
        let mut data = TableData::default();
        assert_eq!(data.assign_key(), RecordKey::new(1));
        assert_eq!(data.assign_key(), RecordKey::new(2));
        assert_eq!(data.next_key, RecordKey::new(3));
    }

    #[test]
    fn table_data_roundtrip() {
        let mut data = TableData::default();
        let k1 = data.assign_key();
        let k2 = data.assign_key();
        data.rows.insert(k1, vec![1, 2, 3]);
        data.rows.insert(k2, vec![4, 5]);

        let encoded = data.encode().unwrap();
        let decoded = TableData::decode(&encoded).unwrap();

        assert_eq!(decoded, data);
    }

    #[test]
    fn table_data_rejects_garbage() {
        assert!(TableData::decode(b"nonsense").is_err());
    }

    #[tokio::test]
    async fn load_missing_snapshot_is_fresh() {
        let backend = Arc::new(InMemoryBackend::new());
        let table = Table::load("items", TableSpec::default(), backend)
            .await
            .unwrap();

        let data = table.data();
        let guard = data.read().await;
        assert!(guard.rows.is_empty());
        assert_eq!(guard.next_key, RecordKey::new(1));
    }

    #[tokio::test]
    async fn persist_then_load_roundtrip() {
        let backend: Arc<dyn StorageBackend> = Arc::new(InMemoryBackend::new());

        let table = Table::create("items", TableSpec::default(), Arc::clone(&backend));
        let mut data = TableData::default();
        let key = data.assign_key();
        data.rows.insert(key, vec![9, 9]);
        table.persist(&data).await.unwrap();

        let reloaded = Table::load("items", TableSpec::default(), backend)
            .await
            .unwrap();
        let reloaded_data = reloaded.data();
        let guard = reloaded_data.read().await;
        assert_eq!(guard.rows.get(&key), Some(&vec![9, 9]));
        assert_eq!(guard.next_key, RecordKey::new(2));
    }
}
