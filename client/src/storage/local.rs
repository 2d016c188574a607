//! Durable partitioned record store.
//!
//! The whole store lives in memory behind one async mutex and is written to
//! `records.json` in the store directory after every mutation. Writes go to
//! a temporary file first and are renamed into place.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs;
use tokio::sync::Mutex;
use turbo_engine::{Partition, Record, Store, StoreSnapshot};

use crate::error::{ClientError, Result};

/// File name of the persisted snapshot.
pub const SNAPSHOT_FILE: &str = "records.json";
const SNAPSHOT_TMP_FILE: &str = "records.json.tmp";

/// Partitioned key-value store persisted to a directory.
#[derive(Debug)]
pub struct LocalRecordStore {
    dir: PathBuf,
    state: Mutex<Store>,
}

fn unavailable(path: &Path, e: impl std::fmt::Display) -> ClientError {
    ClientError::StorageUnavailable(format!("{}: {}", path.display(), e))
}

impl LocalRecordStore {
    /// Open the store in `dir`, creating it if needed and loading the last
    /// persisted state. Opening the same directory again is harmless.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| unavailable(&dir, e))?;

        let path = dir.join(SNAPSHOT_FILE);
        let store = match fs::read_to_string(&path).await {
            Ok(text) => {
                let snapshot = StoreSnapshot::from_json(&text).map_err(|e| unavailable(&path, e))?;
                Store::import_state(snapshot).map_err(|e| unavailable(&path, e))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Store::new(),
            Err(e) => return Err(unavailable(&path, e)),
        };

        tracing::info!(
            dir = %dir.display(),
            records = store.record_count(),
            "Local record store opened"
        );

        Ok(Self {
            dir,
            state: Mutex::new(store),
        })
    }

    /// Directory the store persists into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn persist(&self, store: &Store) -> Result<()> {
        let json = store.export_state().to_json()?;
        let tmp = self.dir.join(SNAPSHOT_TMP_FILE);
        let path = self.dir.join(SNAPSHOT_FILE);

        fs::write(&tmp, json).await.map_err(|e| unavailable(&tmp, e))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| unavailable(&path, e))?;
        Ok(())
    }

    /// Upsert a record by id. The write is on disk when this returns; if
    /// persisting fails the in-memory state is rolled back.
    pub async fn put(&self, partition: Partition, record: Record) -> Result<()> {
        let mut store = self.state.lock().await;
        let previous = store.get(partition, &record.id).cloned();
        let id = record.id.clone();

        store.put(partition, record)?;

        if let Err(e) = self.persist(&store).await {
            match previous {
                Some(previous) => store.put(partition, previous)?,
                None => {
                    store.delete(partition, &id);
                }
            }
            return Err(e);
        }

        tracing::trace!(partition = %partition, id = %id, "Record stored");
        Ok(())
    }

    /// Get a record by id.
    pub async fn get(&self, partition: Partition, id: &str) -> Option<Record> {
        self.state.lock().await.get(partition, id).cloned()
    }

    /// All records of a partition in insertion/update order.
    pub async fn get_all(&self, partition: Partition) -> Vec<Record> {
        self.state.lock().await.get_all(partition)
    }

    /// Delete a record. Deleting an absent id is a no-op.
    pub async fn delete(&self, partition: Partition, id: &str) -> Result<()> {
        let mut store = self.state.lock().await;
        let Some(removed) = store.delete(partition, id) else {
            return Ok(());
        };

        if let Err(e) = self.persist(&store).await {
            store.put(partition, removed)?;
            return Err(e);
        }

        tracing::trace!(partition = %partition, id = %id, "Record deleted");
        Ok(())
    }

    /// Cache records served by the remote API, in one write.
    ///
    /// Each record is stored with the unsynced marker cleared, except where
    /// the local copy is still unsynced. A record clashing with a unique
    /// index is skipped. Returns the records actually stored.
    pub async fn cache_many(
        &self,
        partition: Partition,
        records: &[Record],
    ) -> Result<Vec<Record>> {
        let mut store = self.state.lock().await;
        let before = store.clone();

        let mut stored = Vec::with_capacity(records.len());
        for record in records {
            if store.get(partition, &record.id).is_some_and(|local| local.unsynced) {
                continue;
            }
            let mut cached = record.clone();
            cached.mark_synced();
            match store.put(partition, cached.clone()) {
                Ok(()) => stored.push(cached),
                Err(e) => {
                    tracing::warn!(
                        partition = %partition,
                        id = %record.id,
                        "Skipping cached record: {}",
                        e
                    );
                }
            }
        }
        if stored.is_empty() {
            return Ok(stored);
        }

        if let Err(e) = self.persist(&store).await {
            *store = before;
            return Err(e);
        }

        tracing::trace!(partition = %partition, records = stored.len(), "Remote records cached");
        Ok(stored)
    }

    /// Clear the unsynced marker of `pushed` if the stored copy is unchanged.
    ///
    /// Returns `false` without writing when the record was edited or deleted
    /// after `pushed` was read.
    pub async fn confirm_synced(&self, partition: Partition, pushed: &Record) -> Result<bool> {
        let mut store = self.state.lock().await;
        if !store.confirm_synced(partition, pushed) {
            return Ok(false);
        }

        if let Err(e) = self.persist(&store).await {
            store.put(partition, pushed.clone())?;
            return Err(e);
        }
        Ok(true)
    }

    /// Records whose indexed `field` equals `value`.
    pub async fn find_by_index(
        &self,
        partition: Partition,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Record>> {
        Ok(self
            .state
            .lock()
            .await
            .find_by_index(partition, field, value)?)
    }
}
