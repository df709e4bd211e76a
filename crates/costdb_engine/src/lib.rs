//! # CostDB Engine
//!
//! The transactional object-store engine underneath CostDB.
//!
//! This crate provides:
//! - Named, versioned databases with schema upgrade on version bump
//! - Tables (object stores) keyed by engine-assigned integer keys
//! - Scoped read / read-write transactions with table-level isolation
//! - Forward cursors for sequential traversal
//! - Snapshot persistence through `costdb_storage` backends
//!
//! Records are opaque byte payloads to the engine; the layer above
//! (`costdb_store`) gives them a typed shape.
//!
//! ## Example
//!
//! ```rust,ignore
//! use costdb_engine::{DatabaseVersion, Engine, TableSpec, TransactionMode};
//!
//! let engine = Engine::in_memory();
//! let db = engine
//!     .open("expenses", DatabaseVersion::new(1), |schema| {
//!         schema.create_table("items", TableSpec::default())
//!     })
//!     .await?;
//!
//! let mut txn = db.begin(&["items"], TransactionMode::ReadWrite).await?;
//! let key = txn.add("items", vec![1, 2, 3]).await?;
//! txn.commit().await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cursor;
mod database;
mod dir;
mod engine;
mod error;
mod manifest;
mod table;
mod transaction;
mod types;

pub use cursor::Cursor;
pub use database::Database;
pub use engine::{Engine, SchemaEditor};
pub use error::{EngineError, EngineResult};
pub use manifest::Manifest;
pub use table::TableSpec;
pub use transaction::{Transaction, TransactionMode};
pub use types::{DatabaseVersion, RecordKey};
