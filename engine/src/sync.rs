//! Bookkeeping for replaying unsynced records.
//!
//! The engine does no network IO. It decides which records are due for a
//! push and collects the outcome of each attempt into a [`SyncReport`].

use crate::{Partition, Record, RecordId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Settings key holding the time of the last completed sync run.
pub const LAST_SYNC_KEY: &str = "lastSync";

/// Build a settings record.
pub fn setting(key: impl Into<RecordId>, value: Value) -> Record {
    let mut record = Record::new(key);
    record.insert_field("value", value);
    record
}

/// Read a settings record's value.
pub fn setting_value(record: &Record) -> Option<&Value> {
    record.field("value")
}

/// Records due for a push, in their stored order.
pub fn pending(records: Vec<Record>) -> Vec<Record> {
    records.into_iter().filter(|r| r.unsynced).collect()
}

/// A push that did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedPush {
    pub partition: Partition,
    pub record_id: RecordId,
    pub reason: String,
}

/// Outcome of one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Records confirmed by the remote API, as (partition, id)
    pub pushed: Vec<(Partition, RecordId)>,
    /// Records left unsynced
    pub failed: Vec<FailedPush>,
    /// When the run finished (milliseconds since epoch)
    pub finished_at: Option<Timestamp>,
}

impl SyncReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_pushed(&mut self, partition: Partition, id: impl Into<RecordId>) {
        self.pushed.push((partition, id.into()));
    }

    pub fn record_failed(
        &mut self,
        partition: Partition,
        id: impl Into<RecordId>,
        reason: impl Into<String>,
    ) {
        self.failed.push(FailedPush {
            partition,
            record_id: id.into(),
            reason: reason.into(),
        });
    }

    /// Number of records attempted in the run.
    pub fn attempted(&self) -> usize {
        self.pushed.len() + self.failed.len()
    }

    /// Whether every attempted push succeeded.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}
