//! Sync replay of records saved while offline.
//!
//! A run walks the offline partitions in stored order and creates every
//! unsynced record remotely, one request at a time. Success clears the
//! marker unless the record was edited or deleted while its push was in
//! flight; failure leaves the record for the next run. Only one run is in
//! flight at a time; a trigger that arrives during a run is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::json;
use turbo_engine::{sync, Partition, Resource, SyncReport, LAST_SYNC_KEY};

use crate::now_millis;
use crate::remote::RemoteApi;
use crate::storage::OfflineDb;

/// Replays unsynced records to the remote API.
pub struct Reconciler<R> {
    db: Arc<OfflineDb>,
    remote: Arc<R>,
    running: AtomicBool,
}

/// Clears the running flag however the run ends.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<R: RemoteApi> Reconciler<R> {
    pub fn new(db: Arc<OfflineDb>, remote: Arc<R>) -> Self {
        Self {
            db,
            remote,
            running: AtomicBool::new(false),
        }
    }

    /// Create a reconciler wrapped in Arc for sharing.
    pub fn new_shared(db: Arc<OfflineDb>, remote: Arc<R>) -> Arc<Self> {
        Arc::new(Self::new(db, remote))
    }

    /// Whether a run is in progress.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Run one sync pass.
    ///
    /// Returns `None` without doing anything if a run is already in progress.
    /// Push failures never surface as errors; they are logged and listed in
    /// the report.
    pub async fn run(&self) -> Option<SyncReport> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Sync already running, trigger ignored");
            return None;
        }
        let _guard = RunGuard(&self.running);

        let mut report = SyncReport::new();
        for partition in Partition::OFFLINE {
            self.push_partition(partition, &mut report).await;
        }
        let finished_at = now_millis();
        report.finished_at = Some(finished_at);

        if let Err(e) = self.db.set_setting(LAST_SYNC_KEY, json!(finished_at)).await {
            tracing::warn!("Failed to record last sync time: {}", e);
        }

        if report.attempted() > 0 {
            tracing::info!(
                pushed = report.pushed.len(),
                failed = report.failed.len(),
                "Sync run finished"
            );
        } else {
            tracing::debug!("Sync run finished, nothing pending");
        }

        Some(report)
    }

    async fn push_partition(&self, partition: Partition, report: &mut SyncReport) {
        let Some(resource) = Resource::for_partition(partition) else {
            return;
        };

        for record in sync::pending(self.db.all(partition).await) {
            match self.remote.create(resource, &record).await {
                Ok(_) => match self.db.confirm_synced(partition, &record).await {
                    Ok(confirmed) => {
                        if !confirmed {
                            tracing::debug!(
                                partition = %partition,
                                id = %record.id,
                                "Record changed during push, local copy left as is"
                            );
                        }
                        report.record_pushed(partition, record.id);
                    }
                    Err(e) => {
                        tracing::warn!(
                            partition = %partition,
                            id = %record.id,
                            "Pushed but failed to clear unsynced marker: {}",
                            e
                        );
                        report.record_failed(partition, record.id, e.to_string());
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        partition = %partition,
                        id = %record.id,
                        "Sync push failed: {}",
                        e
                    );
                    report.record_failed(partition, record.id, e.to_string());
                }
            }
        }
    }
}
