//! Store - the in-memory partitioned record container.
//!
//! The Store holds every partition and enforces the declared indexes. It has
//! no knowledge of files; durability is layered on top by exporting and
//! importing [`StoreSnapshot`]s.

use crate::{error::Result, record::index_key, Error, Partition, Record, RecordId, StoreSnapshot};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// A collection of records kept in insertion/update order.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    records: HashMap<RecordId, Record>,
    order: Vec<RecordId>,
}

impl Collection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a record by ID.
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.get(id)
    }

    /// Insert or replace a record. A replaced record moves to the end.
    pub fn upsert(&mut self, record: Record) {
        if self.records.contains_key(&record.id) {
            self.order.retain(|id| id != &record.id);
        }
        self.order.push(record.id.clone());
        self.records.insert(record.id.clone(), record);
    }

    /// Remove a record, returning it if it was present.
    pub fn remove(&mut self, id: &str) -> Option<Record> {
        let removed = self.records.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(removed)
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Iterate records in insertion/update order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    /// Count of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The main store holding all partitions.
#[derive(Debug, Clone)]
pub struct Store {
    partitions: BTreeMap<Partition, Collection>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create a store with every partition initialized and empty.
    pub fn new() -> Self {
        let partitions = Partition::ALL
            .into_iter()
            .map(|p| (p, Collection::new()))
            .collect();
        Self { partitions }
    }

    /// Get a partition's collection.
    pub fn collection(&self, partition: Partition) -> &Collection {
        // Every partition is created in `new`, so the lookup cannot miss.
        &self.partitions[&partition]
    }

    fn collection_mut(&mut self, partition: Partition) -> &mut Collection {
        self.partitions.entry(partition).or_default()
    }

    /// Upsert a record by id. Last write wins; fields are not merged.
    ///
    /// Fails only when a unique index value is already held by a different
    /// record in the same partition.
    pub fn put(&mut self, partition: Partition, record: Record) -> Result<()> {
        self.check_unique(partition, &record)?;
        self.collection_mut(partition).upsert(record);
        Ok(())
    }

    fn check_unique(&self, partition: Partition, record: &Record) -> Result<()> {
        let collection = self.collection(partition);
        for index in partition.indexes().iter().filter(|idx| idx.unique) {
            let Some(key) = record.index_key(index.field) else {
                continue;
            };
            let clash = collection.iter().any(|other| {
                other.id != record.id && other.index_key(index.field).as_ref() == Some(&key)
            });
            if clash {
                return Err(Error::UniqueViolation {
                    partition,
                    field: index.field.to_string(),
                    value: key,
                });
            }
        }
        Ok(())
    }

    /// Get a record by id.
    pub fn get(&self, partition: Partition, id: &str) -> Option<&Record> {
        self.collection(partition).get(id)
    }

    /// All records of a partition in insertion/update order.
    pub fn get_all(&self, partition: Partition) -> Vec<Record> {
        self.collection(partition).iter().cloned().collect()
    }

    /// Delete a record. Deleting an absent id is a no-op.
    pub fn delete(&mut self, partition: Partition, id: &str) -> Option<Record> {
        self.collection_mut(partition).remove(id)
    }

    /// Clear the unsynced marker on the stored copy of `pushed`.
    ///
    /// Only applies when the stored record is still exactly `pushed`; a
    /// record edited or deleted since is left alone and `false` is returned.
    pub fn confirm_synced(&mut self, partition: Partition, pushed: &Record) -> bool {
        if self.get(partition, &pushed.id) != Some(pushed) {
            return false;
        }
        let mut confirmed = pushed.clone();
        confirmed.mark_synced();
        self.collection_mut(partition).upsert(confirmed);
        true
    }

    /// Records whose indexed `field` equals `value`.
    ///
    /// Only fields declared as indexes on the partition can be queried.
    pub fn find_by_index(
        &self,
        partition: Partition,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Record>> {
        if partition.index(field).is_none() {
            return Err(Error::InvalidRecord(format!(
                "{partition} has no index on '{field}'"
            )));
        }
        let Some(key) = index_key(value) else {
            return Ok(Vec::new());
        };
        Ok(self
            .collection(partition)
            .iter()
            .filter(|r| r.index_key(field).as_ref() == Some(&key))
            .cloned()
            .collect())
    }

    /// Records still waiting to be confirmed by the remote API.
    pub fn unsynced(&self, partition: Partition) -> Vec<Record> {
        self.collection(partition)
            .iter()
            .filter(|r| r.unsynced)
            .cloned()
            .collect()
    }

    /// Total number of records across partitions.
    pub fn record_count(&self) -> usize {
        self.partitions.values().map(Collection::len).sum()
    }

    /// Export the current store state as a snapshot.
    pub fn export_state(&self) -> StoreSnapshot {
        let mut snapshot = StoreSnapshot::new();
        for (partition, collection) in &self.partitions {
            snapshot
                .partitions
                .insert(*partition, collection.iter().cloned().collect());
        }
        snapshot
    }

    /// Rebuild a store from a snapshot, re-checking unique indexes.
    pub fn import_state(snapshot: StoreSnapshot) -> Result<Self> {
        let mut store = Self::new();
        for (partition, records) in snapshot.partitions {
            for record in records {
                store
                    .put(partition, record)
                    .map_err(|e| Error::InvalidSnapshot(e.to_string()))?;
            }
        }
        Ok(store)
    }
}
