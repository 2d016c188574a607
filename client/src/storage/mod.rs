//! Local persistence: the durable record store, its fallback mirror, and the
//! [`OfflineDb`] that decides which of the two serves a request.

mod local;
mod mirror;

pub use local::*;
pub use mirror::*;

use std::path::Path;

use serde_json::Value;
use tokio::sync::{Mutex, MutexGuard};
use turbo_engine::{sync, Partition, Record, Store, Timestamp};

use crate::error::Result;
use crate::now_millis;

/// Local data for the session.
///
/// Holds the durable store when it could be opened and the fallback mirror
/// always. Once the store is unavailable every operation goes to the mirror
/// for the rest of the session.
#[derive(Debug)]
pub struct OfflineDb {
    store: Option<LocalRecordStore>,
    mirror: FallbackMirror,
    // held while a new work number is picked and saved
    numbering: Mutex<()>,
}

impl OfflineDb {
    /// Open local data. Never fails: if the store cannot be opened the
    /// session runs on the mirror alone.
    pub async fn open(store_dir: impl AsRef<Path>, mirror_dir: impl AsRef<Path>) -> Self {
        let mirror = FallbackMirror::new(mirror_dir.as_ref());
        let store = match LocalRecordStore::open(store_dir).await {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::warn!("{}; falling back to the cache mirror for this session", e);
                None
            }
        };
        Self::from_parts(store, mirror)
    }

    /// Assemble from already constructed parts.
    pub fn from_parts(store: Option<LocalRecordStore>, mirror: FallbackMirror) -> Self {
        Self {
            store,
            mirror,
            numbering: Mutex::new(()),
        }
    }

    /// Serializes work-number assignment so two offline creates never pick
    /// the same number, with or without the store.
    pub(crate) async fn lock_numbering(&self) -> MutexGuard<'_, ()> {
        self.numbering.lock().await
    }

    /// Whether the durable store is unavailable this session.
    pub fn is_mirror_only(&self) -> bool {
        self.store.is_none()
    }

    pub fn mirror(&self) -> &FallbackMirror {
        &self.mirror
    }

    /// Persist a record created or edited by the user, marked unsynced.
    ///
    /// Stamps the unsynced marker and save time, writes the store, then the
    /// mirror. Saving the same id again overwrites. Returns the stamped
    /// record.
    pub async fn save_locally(&self, partition: Partition, mut record: Record) -> Result<Record> {
        record.mark_unsynced(now_millis());

        match &self.store {
            Some(store) => store.put(partition, record.clone()).await?,
            None => self.check_mirror_indexes(partition, &record).await?,
        }
        self.mirror.mirror(partition, &record).await;

        tracing::debug!(partition = %partition, id = %record.id, "Saved locally, pending sync");
        Ok(record)
    }

    /// The mirrored partition loaded into an in-memory store, so mirror-only
    /// sessions get the same index checks and queries as the durable store.
    async fn mirror_as_store(&self, partition: Partition) -> Store {
        let mut scratch = Store::new();
        for existing in self.mirror.read_mirror(partition).await {
            let id = existing.id.clone();
            if let Err(e) = scratch.put(partition, existing) {
                tracing::warn!(partition = %partition, id = %id, "Ignoring mirrored record: {}", e);
            }
        }
        scratch
    }

    async fn check_mirror_indexes(&self, partition: Partition, record: &Record) -> Result<()> {
        let mut scratch = self.mirror_as_store(partition).await;
        scratch.put(partition, record.clone())?;
        Ok(())
    }

    /// Clear the unsynced marker of a record the remote API has accepted.
    ///
    /// `pushed` is the copy that was sent. If the local record has been
    /// edited or deleted since, nothing is written and `false` is returned;
    /// an edit stays pending for the next run and a deletion stays deleted.
    /// Touches the store only, or the mirror when running without a store.
    pub async fn confirm_synced(&self, partition: Partition, pushed: &Record) -> Result<bool> {
        match &self.store {
            Some(store) => store.confirm_synced(partition, pushed).await,
            None => Ok(self.mirror.confirm_synced(partition, pushed).await),
        }
    }

    /// Cache records served live by the remote API.
    ///
    /// A record whose local copy is still unsynced is skipped so live reads
    /// never clobber edits waiting to be pushed. The store and the mirror
    /// are each written once per call. Failures are logged only.
    pub async fn cache_remote(&self, partition: Partition, records: &[Record]) {
        if records.is_empty() {
            return;
        }
        match &self.store {
            Some(store) => match store.cache_many(partition, records).await {
                Ok(stored) => self.mirror.mirror_many(partition, &stored).await,
                Err(e) => {
                    tracing::warn!(
                        partition = %partition,
                        records = records.len(),
                        "Failed to cache records: {}",
                        e
                    );
                }
            },
            None => {
                self.mirror.cache_many(partition, records).await;
            }
        }
    }

    /// All records of a partition.
    pub async fn all(&self, partition: Partition) -> Vec<Record> {
        match &self.store {
            Some(store) => store.get_all(partition).await,
            None => self.mirror.read_mirror(partition).await,
        }
    }

    /// Look up one record.
    pub async fn get(&self, partition: Partition, id: &str) -> Option<Record> {
        match &self.store {
            Some(store) => store.get(partition, id).await,
            None => self
                .mirror
                .read_mirror(partition)
                .await
                .into_iter()
                .find(|r| r.id == id),
        }
    }

    /// Records whose indexed field equals `value`.
    pub async fn find_by_index(
        &self,
        partition: Partition,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Record>> {
        match &self.store {
            Some(store) => store.find_by_index(partition, field, value).await,
            None => Ok(self
                .mirror_as_store(partition)
                .await
                .find_by_index(partition, field, value)?),
        }
    }

    /// Remove a record from the store and the mirror.
    pub async fn delete(&self, partition: Partition, id: &str) -> Result<()> {
        if let Some(store) = &self.store {
            store.delete(partition, id).await?;
        }
        self.mirror.remove(partition, id).await;
        Ok(())
    }

    /// Read a setting.
    pub async fn setting(&self, key: &str) -> Option<Value> {
        self.get(Partition::Settings, key)
            .await
            .and_then(|r| sync::setting_value(&r).cloned())
    }

    /// Create or overwrite a setting.
    pub async fn set_setting(&self, key: &str, value: Value) -> Result<()> {
        let record = sync::setting(key, value);
        if let Some(store) = &self.store {
            store.put(Partition::Settings, record.clone()).await?;
        }
        self.mirror.mirror(Partition::Settings, &record).await;
        Ok(())
    }

    /// When the last sync run finished, if ever.
    pub async fn last_sync(&self) -> Option<Timestamp> {
        self.setting(turbo_engine::LAST_SYNC_KEY)
            .await
            .and_then(|v| v.as_u64())
    }
}
