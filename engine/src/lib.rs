//! # Turbo Engine
//!
//! Record model and partitioned store behind the Turbo Desk workshop app's
//! offline mode.
//!
//! This crate holds the parts of the offline data layer that need no IO:
//! the record format, the fixed partition set and its indexes, the
//! in-memory store, snapshots, the fallback mirror's text format, the table
//! routing remote resources to partitions, and sync bookkeeping. The
//! `turbo-client` crate adds files, HTTP and scheduling on top.
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! A [`Record`] is a flat JSON object with a string `id`. Records written
//! while the remote API could not be reached carry an *unsynced* marker until
//! a later sync run pushes them.
//!
//! ### Partitions
//!
//! Records live in one of three [`Partition`]s: `clients`, `workOrders` and
//! `settings`. `workOrders.work_number` is a unique index, `clients.name` a
//! non-unique one.
//!
//! ### Routing
//!
//! [`Resource`] names every remote collection. Only clients and work orders
//! have an offline partition; reads of anything else degrade to an empty
//! result.
//!
//! ## Quick Start
//!
//! ```rust
//! use turbo_engine::{Partition, Record, Store};
//! use serde_json::json;
//!
//! let mut store = Store::new();
//!
//! let mut wo = Record::from_value(json!({
//!     "id": "wo-1",
//!     "work_number": "00001",
//!     "status": "DRAFT",
//! }))
//! .unwrap();
//! wo.mark_unsynced(1706745600000);
//! store.put(Partition::WorkOrders, wo).unwrap();
//!
//! let pending = store.unsynced(Partition::WorkOrders);
//! assert_eq!(pending.len(), 1);
//! assert_eq!(pending[0].id, "wo-1");
//! ```
//!
//! ## Persistence
//!
//! Use [`Store::export_state`] and [`Store::import_state`] with
//! [`StoreSnapshot`] to persist a store.

pub mod error;
pub mod mirror;
pub mod partition;
pub mod record;
pub mod routes;
pub mod snapshot;
pub mod store;
pub mod sync;
pub mod workshop;

// Re-export main types at crate root
pub use error::Error;
pub use partition::{IndexDef, Partition};
pub use record::Record;
pub use routes::Resource;
pub use snapshot::{StoreSnapshot, SNAPSHOT_FORMAT_VERSION};
pub use store::{Collection, Store};
pub use sync::{FailedPush, SyncReport, LAST_SYNC_KEY};
pub use workshop::{ClientDraft, WorkOrderDraft, WorkStatus};

/// Type aliases for clarity
pub type RecordId = String;
pub type Timestamp = u64;
