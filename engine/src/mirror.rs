//! Flat-text mirror format.
//!
//! The mirror keeps one JSON array of records per partition under a fixed
//! key. Writes replace the entry with the same id by dropping it and
//! appending the new version.

use crate::{error::Result, Error, Partition, Record, RecordId};
use std::collections::HashMap;

/// Storage key of a partition's mirrored collection.
pub fn mirror_key(partition: Partition) -> String {
    format!("offline_{}", partition.name())
}

/// Replace `record` in the collection: drop any entry with the same id, then
/// append.
pub fn merge(mut collection: Vec<Record>, record: Record) -> Vec<Record> {
    collection.retain(|existing| existing.id != record.id);
    collection.push(record);
    collection
}

/// Replace every record of `records` in the collection in one pass.
///
/// Same result as merging them one at a time: when `records` repeats an id
/// the last occurrence wins.
pub fn merge_many(mut collection: Vec<Record>, records: Vec<Record>) -> Vec<Record> {
    let latest: HashMap<RecordId, usize> = records
        .iter()
        .enumerate()
        .map(|(i, r)| (r.id.clone(), i))
        .collect();
    collection.retain(|existing| !latest.contains_key(&existing.id));
    collection.extend(
        records
            .into_iter()
            .enumerate()
            .filter(|(i, r)| latest.get(&r.id) == Some(i))
            .map(|(_, r)| r),
    );
    collection
}

/// Clear the unsynced marker on the mirrored copy of `pushed`, provided it
/// is still exactly `pushed`. Returns whether anything changed.
pub fn confirm_synced(collection: &mut [Record], pushed: &Record) -> bool {
    match collection.iter_mut().find(|r| r.id == pushed.id) {
        Some(current) if current == pushed => {
            current.mark_synced();
            true
        }
        _ => false,
    }
}

/// Drop the entry with `id`, if any.
pub fn remove(mut collection: Vec<Record>, id: &str) -> Vec<Record> {
    collection.retain(|existing| existing.id != id);
    collection
}

/// Encode a mirrored collection as text.
pub fn encode(collection: &[Record]) -> Result<String> {
    serde_json::to_string(collection).map_err(|e| Error::InvalidRecord(e.to_string()))
}

/// Decode a mirrored collection. Empty text decodes to an empty collection.
pub fn decode(text: &str) -> Result<Vec<Record>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(text).map_err(|e| Error::InvalidRecord(e.to_string()))
}
