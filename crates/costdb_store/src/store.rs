//! The store: transaction gateway, record operations, cursor scanner.

use crate::connection::Connection;
use crate::error::{StoreError, StoreResult};
use crate::record::Record;
use crate::StoreConfig;
use costdb_engine::{Engine, EngineError, RecordKey, Transaction, TransactionMode};
use parking_lot::RwLock;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;

/// Boxed future returned by a transaction body.
pub type TransactionFuture<'t, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 't>>;

/// Maps an engine failure onto the store's operation error.
fn engine_op(e: EngineError) -> StoreError {
    StoreError::operation(e.to_string())
}

/// The cost store: the persistence surface applications talk to.
///
/// A `Store` is configured once, opened once at startup, and then drives
/// every record operation through its own short-lived transaction. The
/// connection lives in an explicit slot on the store - there is no
/// ambient global handle - and every operation fails with
/// [`StoreError::NotInitialized`] until [`open`](Self::open) succeeds.
///
/// Operations never cache records; each call re-reads or re-writes
/// authoritative engine state. Distinct calls are independent atomic
/// units - no atomicity spans two calls.
pub struct Store {
    engine: Arc<Engine>,
    config: StoreConfig,
    connection: RwLock<Option<Connection>>,
}

impl Store {
    /// Creates a store over the given engine.
    ///
    /// No I/O happens until [`open`](Self::open).
    #[must_use]
    pub fn new(engine: Arc<Engine>, config: StoreConfig) -> Self {
        Self {
            engine,
            config,
            connection: RwLock::new(None),
        }
    }

    /// Opens the configured database and declares its tables.
    ///
    /// Safe to call again after a failure; a successful open replaces
    /// the connection slot. See [`Connection::open`] for the upgrade
    /// semantics.
    pub async fn open(&self) -> StoreResult<()> {
        let connection = Connection::open(
            &self.engine,
            &self.config.database,
            self.config.version,
            &self.config.tables,
        )
        .await?;

        *self.connection.write() = Some(connection);
        Ok(())
    }

    /// Checks whether the store has a live connection.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.connection.read().is_some()
    }

    /// Returns the live connection, or `NotInitialized`.
    fn connection(&self) -> StoreResult<Connection> {
        self.connection
            .read()
            .clone()
            .ok_or(StoreError::NotInitialized)
    }

    /// Runs `body` inside a transaction scoped to `tables`.
    ///
    /// The transaction commits when `body` resolves `Ok` and rolls back
    /// when it resolves `Err`; there is no explicit commit. Any engine
    /// failure surfaces as [`StoreError::Operation`].
    ///
    /// Two calls over disjoint table sets proceed concurrently;
    /// overlapping read-write scopes serialize on the engine's table
    /// locks. No atomicity spans two calls.
    pub async fn with_transaction<T, F>(
        &self,
        tables: &[&str],
        mode: TransactionMode,
        body: F,
    ) -> StoreResult<T>
    where
        T: Send,
        F: for<'t> FnOnce(&'t mut Transaction) -> TransactionFuture<'t, T> + Send,
    {
        let connection = self.connection()?;
        if tables.is_empty() {
            return Err(StoreError::operation(
                "transaction scope must name at least one table",
            ));
        }

        let mut txn = connection
            .database()
            .begin(tables, mode)
            .await
            .map_err(engine_op)?;

        match body(&mut txn).await {
            Ok(value) => {
                txn.commit().await.map_err(engine_op)?;
                Ok(value)
            }
            Err(e) => {
                // Roll back without masking the body's error
                txn.rollback();
                Err(e)
            }
        }
    }

    /// Inserts a record and returns its engine-assigned identifier.
    ///
    /// The record must not carry an identifier already; identifiers are
    /// assigned by the engine, starting at 1 per table.
    pub async fn add<R>(&self, table: &str, record: &R) -> StoreResult<RecordKey>
    where
        R: Record,
    {
        if record.key().is_some() {
            return Err(StoreError::operation(
                "record already carries an identifier; identifiers are assigned on add",
            ));
        }

        let payload = record.encode()?;
        let table_name = table.to_string();
        let key = self
            .with_transaction(&[table], TransactionMode::ReadWrite, move |txn| {
                Box::pin(async move { txn.add(&table_name, payload).await.map_err(engine_op) })
            })
            .await?;

        debug!(table, %key, "record added");
        Ok(key)
    }

    /// Reads a single record by identifier.
    pub async fn get<R>(&self, table: &str, key: RecordKey) -> StoreResult<Option<R>>
    where
        R: Record + 'static,
    {
        let table_name = table.to_string();
        self.with_transaction(&[table], TransactionMode::ReadOnly, move |txn| {
            Box::pin(async move {
                match txn.get(&table_name, key).await.map_err(engine_op)? {
                    Some(bytes) => Ok(Some(R::decode(key, &bytes)?)),
                    None => Ok(None),
                }
            })
        })
        .await
    }

    /// Reads every record in the table, in the engine's storage order.
    ///
    /// An empty table yields an empty vec, never an error.
    pub async fn get_all<R>(&self, table: &str) -> StoreResult<Vec<R>>
    where
        R: Record + 'static,
    {
        let table_name = table.to_string();
        self.with_transaction(&[table], TransactionMode::ReadOnly, move |txn| {
            Box::pin(async move {
                let rows = txn.get_all(&table_name).await.map_err(engine_op)?;
                rows.into_iter()
                    .map(|(key, bytes)| R::decode(key, &bytes))
                    .collect()
            })
        })
        .await
    }

    /// Returns the number of records in the table.
    pub async fn count(&self, table: &str) -> StoreResult<usize> {
        let table_name = table.to_string();
        self.with_transaction(&[table], TransactionMode::ReadOnly, move |txn| {
            Box::pin(async move {
                Ok(txn.get_all(&table_name).await.map_err(engine_op)?.len())
            })
        })
        .await
    }

    /// Merges `patch` into the record at `key` and returns the result.
    ///
    /// Read-then-merge-then-write runs inside a single read-write
    /// transaction: fields present in the patch override, fields absent
    /// keep their stored value, the identifier never changes. Fails with
    /// [`StoreError::NotFound`] when no record exists at `key`.
    pub async fn update<R>(&self, table: &str, key: RecordKey, patch: R::Patch) -> StoreResult<R>
    where
        R: Record + 'static,
        R::Patch: 'static,
    {
        let table_name = table.to_string();
        let merged = self
            .with_transaction(&[table], TransactionMode::ReadWrite, move |txn| {
                Box::pin(async move {
                    let bytes = txn
                        .get(&table_name, key)
                        .await
                        .map_err(engine_op)?
                        .ok_or(StoreError::NotFound { key })?;

                    let existing = R::decode(key, &bytes)?;
                    let merged = existing.merge(patch);
                    txn.put(&table_name, key, merged.encode()?)
                        .await
                        .map_err(engine_op)?;
                    Ok(merged)
                })
            })
            .await?;

        debug!(table, %key, "record updated");
        Ok(merged)
    }

    /// Deletes the record at `key`.
    ///
    /// Idempotent: deleting a missing identifier resolves without error.
    pub async fn delete(&self, table: &str, key: RecordKey) -> StoreResult<()> {
        let table_name = table.to_string();
        self.with_transaction(&[table], TransactionMode::ReadWrite, move |txn| {
            Box::pin(async move { txn.delete(&table_name, key).await.map_err(engine_op) })
        })
        .await?;

        debug!(table, %key, "record deleted");
        Ok(())
    }

    /// Collects the records for which `predicate` returns `true`, in
    /// table order.
    ///
    /// Walks a forward cursor inside a read-only transaction. The
    /// predicate must be pure: it receives each record by shared
    /// reference and must not perform async work. A record that fails to
    /// decode aborts the scan with no partial result.
    ///
    /// This is the only filtered retrieval; cost is linear in table
    /// size.
    pub async fn scan<R, P>(&self, table: &str, predicate: P) -> StoreResult<Vec<R>>
    where
        R: Record + 'static,
        P: FnMut(&R) -> bool + Send + 'static,
    {
        let table_name = table.to_string();
        self.with_transaction(&[table], TransactionMode::ReadOnly, move |txn| {
            Box::pin(async move {
                let mut cursor = txn.open_cursor(&table_name).await.map_err(engine_op)?;
                let mut predicate = predicate;
                let mut results = Vec::new();

                while let Some((key, bytes)) = cursor.step().await {
                    let record = R::decode(key, &bytes)?;
                    if predicate(&record) {
                        results.push(record);
                    }
                }

                Ok(results)
            })
        })
        .await
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("database", &self.config.database)
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}
