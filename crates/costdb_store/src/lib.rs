//! # CostDB Store
//!
//! The cost-record persistence layer on top of the CostDB engine.
//!
//! This crate is the surface applications talk to. It provides:
//! - Connection management: open a named, versioned database and declare
//!   its tables once at startup
//! - A transaction gateway that scopes every logical operation to its
//!   own short-lived engine transaction
//! - Record operations: `add`, `get`, `get_all`, `update` (field-merge),
//!   `delete`, `count`
//! - Predicate-driven retrieval via a forward cursor (`scan`)
//!
//! Records implement the [`Record`] trait; [`CostItem`] is the domain
//! record for cost tracking (amount, category, description, date).
//!
//! ## Example
//!
//! ```rust,ignore
//! use costdb_engine::Engine;
//! use costdb_store::{CostItem, CostItemPatch, Store, StoreConfig, TableDecl};
//! use std::sync::Arc;
//!
//! let engine = Arc::new(Engine::in_memory());
//! let store = Store::new(
//!     engine,
//!     StoreConfig::new("CostManagerDB").table(TableDecl::new("costItems")),
//! );
//! store.open().await?;
//!
//! let lunch = CostItem::new(12.5, "Food", "lunch", "2024-03-15");
//! let key = store.add("costItems", &lunch).await?;
//!
//! let march: Vec<CostItem> = store
//!     .scan("costItems", |item: &CostItem| item.month() == Some(3))
//!     .await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod connection;
mod error;
mod item;
mod record;
mod store;

pub use config::StoreConfig;
pub use connection::{Connection, TableDecl};
pub use costdb_engine::{RecordKey, TransactionMode};
pub use error::{StoreError, StoreResult};
pub use item::{CostItem, CostItemPatch};
pub use record::Record;
pub use store::{Store, TransactionFuture};
