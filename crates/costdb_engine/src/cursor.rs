//! Forward cursors over a table's records.

use crate::types::RecordKey;

/// A forward cursor over a table, in ascending key order.
///
/// Cursors are created by [`crate::Transaction::open_cursor`] and visit
/// the transaction's view of the table at the moment they are opened -
/// committed rows merged with the transaction's own pending writes.
/// Each [`step`](Self::step) yields the next record until the table is
/// exhausted.
#[derive(Debug)]
pub struct Cursor {
    entries: std::vec::IntoIter<(RecordKey, Vec<u8>)>,
}

impl Cursor {
    /// Creates a cursor over the given entries.
    pub(crate) fn new(entries: Vec<(RecordKey, Vec<u8>)>) -> Self {
        Self {
            entries: entries.into_iter(),
        }
    }

    /// Advances to the next record.
    ///
    /// Returns `None` once the table is exhausted; subsequent calls keep
    /// returning `None`.
    pub async fn step(&mut self) -> Option<(RecordKey, Vec<u8>)> {
        self.entries.next()
    }

    /// Returns the number of records not yet visited.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.entries.len()
    }
}
