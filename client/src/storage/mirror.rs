//! Fallback cache mirror.
//!
//! A best-effort copy of every locally written record, kept as one JSON text
//! file per partition. Nothing here returns an error: a mirror that cannot be
//! read looks empty and a mirror that cannot be written is logged and left
//! alone.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::sync::Mutex;
use turbo_engine::{mirror, Partition, Record};

/// Text mirror of records keyed by partition name.
#[derive(Debug)]
pub struct FallbackMirror {
    dir: PathBuf,
    // serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl FallbackMirror {
    /// Mirror rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, partition: Partition) -> PathBuf {
        self.dir.join(format!("{}.json", mirror::mirror_key(partition)))
    }

    /// The mirrored collection, empty if never written or unreadable.
    pub async fn read_mirror(&self, partition: Partition) -> Vec<Record> {
        let _guard = self.lock.lock().await;
        self.read_unlocked(partition).await
    }

    async fn read_unlocked(&self, partition: Partition) -> Vec<Record> {
        let path = self.path(partition);
        let text = match fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), "Failed to read mirror: {}", e);
                return Vec::new();
            }
        };

        match mirror::decode(&text) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(path = %path.display(), "Discarding unreadable mirror: {}", e);
                Vec::new()
            }
        }
    }

    async fn write_unlocked(&self, partition: Partition, collection: &[Record]) {
        let path = self.path(partition);
        let text = match mirror::encode(collection) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(partition = %partition, "Failed to encode mirror: {}", e);
                return;
            }
        };

        if let Err(e) = fs::create_dir_all(&self.dir).await {
            tracing::warn!(dir = %self.dir.display(), "Failed to create mirror directory: {}", e);
            return;
        }
        if let Err(e) = fs::write(&path, text).await {
            tracing::warn!(path = %path.display(), "Failed to write mirror: {}", e);
        }
    }

    /// Replace `record` in the partition's mirrored collection.
    pub async fn mirror(&self, partition: Partition, record: &Record) {
        let _guard = self.lock.lock().await;
        let collection = self.read_unlocked(partition).await;
        let merged = mirror::merge(collection, record.clone());
        self.write_unlocked(partition, &merged).await;
    }

    /// Replace every record of `records` with one read and one write.
    pub async fn mirror_many(&self, partition: Partition, records: &[Record]) {
        if records.is_empty() {
            return;
        }
        let _guard = self.lock.lock().await;
        let collection = self.read_unlocked(partition).await;
        let merged = mirror::merge_many(collection, records.to_vec());
        self.write_unlocked(partition, &merged).await;
    }

    /// Mirror records served by the remote API with the unsynced marker
    /// cleared, skipping any whose mirrored copy is still unsynced. Returns
    /// how many were written.
    pub async fn cache_many(&self, partition: Partition, records: &[Record]) -> usize {
        let _guard = self.lock.lock().await;
        let collection = self.read_unlocked(partition).await;

        let fresh: Vec<Record> = records
            .iter()
            .filter(|record| {
                !collection
                    .iter()
                    .any(|local| local.id == record.id && local.unsynced)
            })
            .map(|record| {
                let mut cached = record.clone();
                cached.mark_synced();
                cached
            })
            .collect();
        if fresh.is_empty() {
            return 0;
        }

        let count = fresh.len();
        let merged = mirror::merge_many(collection, fresh);
        self.write_unlocked(partition, &merged).await;
        count
    }

    /// Clear the unsynced marker of `pushed` if the mirrored copy is
    /// unchanged. Returns whether it was cleared.
    pub async fn confirm_synced(&self, partition: Partition, pushed: &Record) -> bool {
        let _guard = self.lock.lock().await;
        let mut collection = self.read_unlocked(partition).await;
        if !mirror::confirm_synced(&mut collection, pushed) {
            return false;
        }
        self.write_unlocked(partition, &collection).await;
        true
    }

    /// Drop the record with `id` from the partition's mirrored collection.
    pub async fn remove(&self, partition: Partition, id: &str) {
        let _guard = self.lock.lock().await;
        let collection = self.read_unlocked(partition).await;
        let before = collection.len();
        let remaining = mirror::remove(collection, id);
        if remaining.len() != before {
            self.write_unlocked(partition, &remaining).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(id: &str, name: &str) -> Record {
        Record::from_value(json!({"id": id, "name": name})).unwrap()
    }

    #[tokio::test]
    async fn never_written_reads_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror = FallbackMirror::new(tmp.path().join("mirror"));
        assert!(mirror.read_mirror(Partition::Clients).await.is_empty());
    }

    #[tokio::test]
    async fn mirror_overwrites_by_id() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror = FallbackMirror::new(tmp.path());

        mirror.mirror(Partition::Clients, &client("a", "A")).await;
        mirror.mirror(Partition::Clients, &client("b", "B")).await;
        mirror.mirror(Partition::Clients, &client("a", "A2")).await;

        let records = mirror.read_mirror(Partition::Clients).await;
        let names: Vec<_> = records
            .iter()
            .map(|r| r.field("name").unwrap().as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["B", "A2"]);
        assert!(tmp.path().join("offline_clients.json").is_file());
    }

    #[tokio::test]
    async fn partitions_are_separate_files() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror = FallbackMirror::new(tmp.path());

        mirror.mirror(Partition::Clients, &client("a", "A")).await;
        assert!(mirror.read_mirror(Partition::WorkOrders).await.is_empty());
    }

    #[tokio::test]
    async fn write_failure_is_swallowed() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("mirror");
        std::fs::write(&blocker, b"file, not dir").unwrap();

        let mirror = FallbackMirror::new(&blocker);
        mirror.mirror(Partition::Clients, &client("a", "A")).await;
        mirror.remove(Partition::Clients, "a").await;
        assert!(mirror.read_mirror(Partition::Clients).await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_mirror_reads_empty() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("offline_workOrders.json"), b"[{").unwrap();

        let mirror = FallbackMirror::new(tmp.path());
        assert!(mirror.read_mirror(Partition::WorkOrders).await.is_empty());

        // the next write starts a fresh collection
        mirror.mirror(Partition::WorkOrders, &Record::new("wo-1")).await;
        assert_eq!(mirror.read_mirror(Partition::WorkOrders).await.len(), 1);
    }

    #[tokio::test]
    async fn remove_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror = FallbackMirror::new(tmp.path());
        mirror.mirror(Partition::Clients, &client("a", "A")).await;
        mirror.mirror(Partition::Clients, &client("b", "B")).await;

        mirror.remove(Partition::Clients, "a").await;
        mirror.remove(Partition::Clients, "missing").await;

        let ids: Vec<_> = mirror
            .read_mirror(Partition::Clients)
            .await
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[tokio::test]
    async fn cache_many_keeps_pending_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror = FallbackMirror::new(tmp.path());
        let mut pending = client("a", "local");
        pending.mark_unsynced(3);
        mirror.mirror(Partition::Clients, &pending).await;

        let written = mirror
            .cache_many(Partition::Clients, &[client("a", "server"), client("b", "B")])
            .await;
        assert_eq!(written, 1);

        let records = mirror.read_mirror(Partition::Clients).await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], pending);
        assert_eq!(records[1].id, "b");
        assert!(!records[1].unsynced);
    }

    #[tokio::test]
    async fn mirror_many_replaces_by_id() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror = FallbackMirror::new(tmp.path());
        mirror.mirror(Partition::Clients, &client("a", "A")).await;

        mirror
            .mirror_many(Partition::Clients, &[client("b", "B"), client("a", "A2")])
            .await;

        let names: Vec<_> = mirror
            .read_mirror(Partition::Clients)
            .await
            .iter()
            .map(|r| r.field("name").unwrap().as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["B", "A2"]);
    }

    #[tokio::test]
    async fn confirm_synced_leaves_edited_entry_pending() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror = FallbackMirror::new(tmp.path());
        let mut pushed = client("a", "v1");
        pushed.mark_unsynced(1);
        mirror.mirror(Partition::Clients, &pushed).await;

        let mut edited = client("a", "v2");
        edited.mark_unsynced(2);
        mirror.mirror(Partition::Clients, &edited).await;

        assert!(!mirror.confirm_synced(Partition::Clients, &pushed).await);
        assert_eq!(mirror.read_mirror(Partition::Clients).await, vec![edited.clone()]);
        assert!(mirror.confirm_synced(Partition::Clients, &edited).await);
        assert!(!mirror.read_mirror(Partition::Clients).await[0].unsynced);
    }
}
