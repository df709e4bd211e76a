//! Transactions: scoped, buffered units of work against a set of tables.

use crate::cursor::Cursor;
use crate::error::{EngineError, EngineResult};
use crate::table::{Table, TableData};
use crate::types::RecordKey;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard};

/// Mode of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionMode {
    /// Reads only; runs concurrently with other read-only transactions.
    ReadOnly,
    /// Reads and writes; exclusive per table for the transaction's lifetime.
    ReadWrite,
}

impl TransactionMode {
    /// Checks whether this mode permits writes.
    #[must_use]
    pub fn is_write(self) -> bool {
        matches!(self, Self::ReadWrite)
    }
}

/// A buffered write awaiting commit.
#[derive(Debug, Clone)]
pub(crate) enum PendingWrite {
    /// Insert or replace a record.
    Put(Vec<u8>),
    /// Remove a record.
    Delete,
}

/// Access a transaction holds on one table.
enum TableAccess {
    /// Shared guard; the table contents are read-only.
    Read(OwnedRwLockReadGuard<TableData>),
    /// Exclusive guard plus the pending-write overlay.
    Write {
        guard: OwnedRwLockWriteGuard<TableData>,
        pending: BTreeMap<RecordKey, PendingWrite>,
    },
}

impl TableAccess {
    fn data(&self) -> &TableData {
        match self {
            Self::Read(guard) => guard,
            Self::Write { guard, .. } => guard,
        }
    }

    fn pending(&self) -> Option<&BTreeMap<RecordKey, PendingWrite>> {
        match self {
            Self::Read(_) => None,
            Self::Write { pending, .. } => Some(pending),
        }
    }
}

struct TableSlot {
    table: Arc<Table>,
    access: TableAccess,
}

/// A scoped transaction over a fixed set of tables.
///
/// Writes are buffered in a per-table overlay and applied on
/// [`commit`](Self::commit); dropping the transaction (or calling
/// [`rollback`](Self::rollback)) discards them. Reads within the
/// transaction see its own pending writes.
///
/// The transaction holds owned lock guards on its tables for its whole
/// lifetime. Guards are acquired in ascending table-name order, which is
/// the engine-wide lock-order invariant. This is what serializes
/// overlapping read-write transactions and lets disjoint or read-only
/// transactions proceed concurrently.
///
/// Requests execute in submission order; the `&mut` receiver on write
/// requests makes interleaving within one transaction impossible.
/// Completion is driven by the layer above (commit on success, rollback
/// on failure) - there is no partially-committed state.
pub struct Transaction {
    mode: TransactionMode,
    slots: BTreeMap<String, TableSlot>,
}

impl Transaction {
    /// Begins a transaction over the given tables.
    ///
    /// Suspends until all table guards are acquired.
    pub(crate) async fn begin(mut tables: Vec<Arc<Table>>, mode: TransactionMode) -> Self {
        // Lock-order invariant: ascending table name
        tables.sort_by(|a, b| a.name().cmp(b.name()));
        tables.dedup_by(|a, b| a.name() == b.name());

        let mut slots = BTreeMap::new();
        for table in tables {
            let data = table.data();
            let access = match mode {
                TransactionMode::ReadOnly => TableAccess::Read(data.read_owned().await),
                TransactionMode::ReadWrite => TableAccess::Write {
                    guard: data.write_owned().await,
                    pending: BTreeMap::new(),
                },
            };
            slots.insert(table.name().to_string(), TableSlot { table, access });
        }

        Self { mode, slots }
    }

    /// Returns the transaction mode.
    #[must_use]
    pub fn mode(&self) -> TransactionMode {
        self.mode
    }

    /// Returns the names of the tables in scope, in ascending order.
    #[must_use]
    pub fn tables(&self) -> Vec<String> {
        self.slots.keys().cloned().collect()
    }

    fn slot(&self, table: &str) -> EngineResult<&TableSlot> {
        self.slots.get(table).ok_or_else(|| EngineError::NotInScope {
            name: table.to_string(),
        })
    }

    fn write_parts(
        &mut self,
        table: &str,
    ) -> EngineResult<(
        &mut OwnedRwLockWriteGuard<TableData>,
        &mut BTreeMap<RecordKey, PendingWrite>,
    )> {
        let slot = self.slots.get_mut(table).ok_or_else(|| EngineError::NotInScope {
            name: table.to_string(),
        })?;
        match &mut slot.access {
            TableAccess::Read(_) => Err(EngineError::ReadOnly {
                name: table.to_string(),
            }),
            TableAccess::Write { guard, pending } => Ok((guard, pending)),
        }
    }

    /// Inserts a record, assigning its key from the table's generator.
    ///
    /// The generator advances immediately and is not rewound on
    /// rollback, so returned keys are unique for the table's lifetime.
    pub async fn add(&mut self, table: &str, payload: Vec<u8>) -> EngineResult<RecordKey> {
        let (guard, pending) = self.write_parts(table)?;

        let key = guard.assign_key();
        if guard.rows.contains_key(&key) || pending.contains_key(&key) {
            return Err(EngineError::KeyExists { key });
        }
        pending.insert(key, PendingWrite::Put(payload));
        Ok(key)
    }

    /// Inserts or replaces the record at `key`.
    pub async fn put(&mut self, table: &str, key: RecordKey, payload: Vec<u8>) -> EngineResult<()> {
        let (_, pending) = self.write_parts(table)?;
        pending.insert(key, PendingWrite::Put(payload));
        Ok(())
    }

    /// Removes the record at `key`, if present.
    ///
    /// Deleting a missing key is a no-op, not an error.
    pub async fn delete(&mut self, table: &str, key: RecordKey) -> EngineResult<()> {
        let (_, pending) = self.write_parts(table)?;
        pending.insert(key, PendingWrite::Delete);
        Ok(())
    }

    /// Reads the record at `key`, seeing this transaction's own writes.
    pub async fn get(&self, table: &str, key: RecordKey) -> EngineResult<Option<Vec<u8>>> {
        let slot = self.slot(table)?;

        if let Some(pending) = slot.access.pending() {
            if let Some(write) = pending.get(&key) {
                return Ok(match write {
                    PendingWrite::Put(payload) => Some(payload.clone()),
                    PendingWrite::Delete => None,
                });
            }
        }

        Ok(slot.access.data().rows.get(&key).cloned())
    }

    /// Reads every record in the table, in ascending key order.
    pub async fn get_all(&self, table: &str) -> EngineResult<Vec<(RecordKey, Vec<u8>)>> {
        let slot = self.slot(table)?;
        Ok(effective_rows(slot.access.data(), slot.access.pending()))
    }

    /// Opens a forward cursor over the table, in ascending key order.
    ///
    /// The cursor sees this transaction's own pending writes.
    pub async fn open_cursor(&self, table: &str) -> EngineResult<Cursor> {
        let slot = self.slot(table)?;
        Ok(Cursor::new(effective_rows(
            slot.access.data(),
            slot.access.pending(),
        )))
    }

    /// Commits the transaction.
    ///
    /// Every written table's snapshot is persisted before any in-memory
    /// state changes; a persist failure therefore aborts the commit with
    /// live state untouched. Guards are released when the transaction is
    /// consumed.
    pub async fn commit(mut self) -> EngineResult<()> {
        let mut staged: Vec<(String, TableData)> = Vec::new();

        for (name, slot) in &self.slots {
            if let TableAccess::Write { guard, pending } = &slot.access {
                if pending.is_empty() {
                    continue;
                }
                let mut next = (**guard).clone();
                for (key, write) in pending {
                    match write {
                        PendingWrite::Put(payload) => {
                            next.rows.insert(*key, payload.clone());
                        }
                        PendingWrite::Delete => {
                            next.rows.remove(key);
                        }
                    }
                }
                slot.table.persist(&next).await?;
                staged.push((name.clone(), next));
            }
        }

        for (name, next) in staged {
            if let Some(slot) = self.slots.get_mut(&name) {
                if let TableAccess::Write { guard, .. } = &mut slot.access {
                    **guard = next;
                }
            }
        }

        tracing::debug!(tables = self.slots.len(), "transaction committed");
        Ok(())
    }

    /// Discards the transaction's pending writes and releases its guards.
    ///
    /// Equivalent to dropping the transaction; spelled out so abort
    /// paths read explicitly.
    pub fn rollback(self) {
        tracing::debug!(tables = self.slots.len(), "transaction rolled back");
        drop(self);
    }
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("mode", &self.mode)
            .field("tables", &self.tables())
            .finish_non_exhaustive()
    }
}

/// Merges committed rows with a pending overlay, in ascending key order.
fn effective_rows(
    data: &TableData,
    pending: Option<&BTreeMap<RecordKey, PendingWrite>>,
) -> Vec<(RecordKey, Vec<u8>)> {
    let mut merged: BTreeMap<RecordKey, Vec<u8>> = BTreeMap::new();

    for (key, payload) in &data.rows {
        match pending.and_then(|p| p.get(key)) {
            Some(PendingWrite::Delete) => {}
            Some(PendingWrite::Put(overlay)) => {
                merged.insert(*key, overlay.clone());
            }
            None => {
                merged.insert(*key, payload.clone());
            }
        }
    }

    if let Some(pending) = pending {
        for (key, write) in pending {
            if let PendingWrite::Put(payload) = write {
                merged.entry(*key).or_insert_with(|| payload.clone());
            }
        }
    }

    merged.into_iter().collect()
}
