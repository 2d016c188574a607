//! Creating clients and work orders while offline.
//!
//! New records get a fresh UUID and, for work orders, the next local work
//! number before being saved as unsynced.

use turbo_engine::workshop::next_work_sequence;
use turbo_engine::{ClientDraft, Partition, Record, WorkOrderDraft};
use uuid::Uuid;

use crate::error::Result;
use crate::storage::OfflineDb;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Save a new client locally, pending sync.
pub async fn create_client_offline(db: &OfflineDb, draft: ClientDraft) -> Result<Record> {
    let record = draft.into_record(new_id())?;
    db.save_locally(Partition::Clients, record).await
}

/// Save a new `DRAFT` work order locally, pending sync.
///
/// The work number is the next one free in the local partition; concurrent
/// calls are serialized so each gets its own. The server may renumber on its
/// side; the local id never changes.
pub async fn create_work_order_offline(db: &OfflineDb, draft: WorkOrderDraft) -> Result<Record> {
    let _numbering = db.lock_numbering().await;
    let sequence = next_work_sequence(&db.all(Partition::WorkOrders).await);
    let record = draft.into_record(new_id(), sequence)?;
    tracing::debug!(id = %record.id, sequence, "New offline work order");
    db.save_locally(Partition::WorkOrders, record).await
}
