//! Record trait for types stored in cost store tables.

use crate::error::StoreResult;
use costdb_engine::RecordKey;

/// Trait for types that can be stored as records.
///
/// Implementors provide:
/// - `key()`: the record's identifier, `None` until the engine assigns
///   one on insert
/// - `merge()`: presence-checked field override used by `update`
/// - `encode()`/`decode()`: the CBOR payload codec; the identifier is
///   NOT part of the payload - it lives in the table's key space and is
///   supplied from storage on decode
///
/// # Example
///
/// ```rust,ignore
/// use costdb_store::{Record, RecordKey, StoreResult};
///
/// struct Note {
///     id: Option<RecordKey>,
///     text: String,
/// }
///
/// struct NotePatch {
///     text: Option<String>,
/// }
///
/// impl Record for Note {
///     type Patch = NotePatch;
///
///     fn key(&self) -> Option<RecordKey> {
///         self.id
///     }
///
///     fn merge(&self, patch: NotePatch) -> Self {
///         Note {
///             id: self.id,
///             text: patch.text.unwrap_or_else(|| self.text.clone()),
///         }
///     }
///
///     // encode/decode via serde + ciborium ...
/// }
/// ```
pub trait Record: Sized + Send {
    /// The partial-record type accepted by `update`.
    type Patch: Send;

    /// Returns the record's identifier, if one has been assigned.
    ///
    /// A record headed for `add` must return `None`; the engine assigns
    /// the identifier. Once assigned, the identifier never changes.
    fn key(&self) -> Option<RecordKey>;

    /// Builds the merged record: fields present in `patch` override,
    /// fields absent keep this record's value, the identifier is
    /// preserved.
    #[must_use]
    fn merge(&self, patch: Self::Patch) -> Self;

    /// Encodes the record payload to CBOR bytes.
    ///
    /// The identifier is excluded; it is the table key.
    fn encode(&self) -> StoreResult<Vec<u8>>;

    /// Decodes a record from its payload bytes and storage key.
    fn decode(key: RecordKey, bytes: &[u8]) -> StoreResult<Self>;
}
