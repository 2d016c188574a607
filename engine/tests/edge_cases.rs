//! Edge case and property tests for turbo-engine
//!
//! These tests cover store semantics across arbitrary inputs and unusual
//! record shapes.

use proptest::prelude::*;
use serde_json::{json, Value};
use turbo_engine::{mirror, Error, Partition, Record, Store, StoreSnapshot};

fn partition_strategy() -> impl Strategy<Value = Partition> {
    prop_oneof![
        Just(Partition::Clients),
        Just(Partition::WorkOrders),
        Just(Partition::Settings),
    ]
}

fn record_strategy() -> impl Strategy<Value = Record> {
    (
        "[a-z0-9-]{1,12}",
        ".{0,24}",
        any::<bool>(),
        proptest::option::of(any::<u32>()),
    )
        .prop_map(|(id, name, unsynced, saved_at)| {
            let mut record = Record::from_value(json!({"id": id, "name": name})).unwrap();
            if unsynced {
                record.mark_unsynced(u64::from(saved_at.unwrap_or(0)));
            }
            record
        })
}

// ============================================================================
// Store properties
// ============================================================================

proptest! {
    #[test]
    fn put_twice_equals_put_once(partition in partition_strategy(), record in record_strategy()) {
        let mut once = Store::new();
        once.put(partition, record.clone()).unwrap();

        let mut twice = Store::new();
        twice.put(partition, record.clone()).unwrap();
        twice.put(partition, record.clone()).unwrap();

        prop_assert_eq!(once.get(partition, &record.id), twice.get(partition, &record.id));
        prop_assert_eq!(once.get_all(partition), twice.get_all(partition));
    }

    #[test]
    fn delete_of_absent_id_changes_nothing(
        partition in partition_strategy(),
        records in proptest::collection::vec(record_strategy(), 0..8),
        absent in "[A-Z]{1,8}",
    ) {
        let mut store = Store::new();
        for record in records {
            store.put(partition, record).unwrap();
        }
        let before = store.get_all(partition);

        prop_assert!(store.delete(partition, &absent).is_none());
        prop_assert_eq!(store.get_all(partition), before);
    }

    #[test]
    fn snapshot_roundtrip_preserves_every_partition(
        records in proptest::collection::vec((partition_strategy(), record_strategy()), 0..16),
    ) {
        let mut store = Store::new();
        for (partition, record) in records {
            store.put(partition, record).unwrap();
        }

        let json = store.export_state().to_json().unwrap();
        let restored = Store::import_state(StoreSnapshot::from_json(&json).unwrap()).unwrap();
        for partition in Partition::ALL {
            prop_assert_eq!(restored.get_all(partition), store.get_all(partition));
        }
    }

    #[test]
    fn mirror_merge_holds_one_entry_per_id(
        records in proptest::collection::vec(record_strategy(), 0..16),
    ) {
        let mut collection = Vec::new();
        for record in &records {
            collection = mirror::merge(collection, record.clone());
        }

        let mut ids: Vec<_> = collection.iter().map(|r| r.id.clone()).collect();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), collection.len());
        if let Some(last) = records.last() {
            prop_assert_eq!(collection.last(), Some(last));
        }
    }
}

// ============================================================================
// Record shape edge cases
// ============================================================================

#[test]
fn unicode_field_values() {
    let mut store = Store::new();
    let names = ["Kovács Péter", "Ștefan Mureșan", "日本語テスト", "🎉🚀", "Null\0Test"];

    for (i, name) in names.iter().enumerate() {
        let record = Record::from_value(json!({"id": format!("c-{i}"), "name": name})).unwrap();
        store.put(Partition::Clients, record).unwrap();

        let stored = store.get(Partition::Clients, &format!("c-{i}")).unwrap();
        assert_eq!(stored.field("name"), Some(&json!(name)));
    }
}

#[test]
fn embedded_part_and_process_lists_survive() {
    let mut store = Store::new();
    let record = Record::from_value(json!({
        "id": "wo-1",
        "work_number": "00001",
        "parts": [
            {"part_id": "p-1", "part_code": "CHRA-1", "category": "C.H.R.A",
             "supplier": "Melett", "price": 120.5, "selected": true}
        ],
        "processes": [
            {"process_id": "pr-1", "process_name": "Cleaning", "category": "Cleaning",
             "estimated_time": 30, "price": 50.0, "selected": false, "notes": ""}
        ]
    }))
    .unwrap();
    store.put(Partition::WorkOrders, record.clone()).unwrap();

    let restored =
        Store::import_state(StoreSnapshot::from_json(&store.export_state().to_json().unwrap()).unwrap())
            .unwrap();
    assert_eq!(restored.get(Partition::WorkOrders, "wo-1"), Some(&record));
}

#[test]
fn numeric_and_string_work_numbers_share_the_index() {
    let mut store = Store::new();
    store
        .put(
            Partition::WorkOrders,
            Record::from_value(json!({"id": "a", "work_number": 1})).unwrap(),
        )
        .unwrap();

    let err = store
        .put(
            Partition::WorkOrders,
            Record::from_value(json!({"id": "b", "work_number": "1"})).unwrap(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::UniqueViolation { .. }));
}

#[test]
fn null_work_number_is_not_indexed() {
    let mut store = Store::new();
    for id in ["a", "b"] {
        store
            .put(
                Partition::WorkOrders,
                Record::from_value(json!({"id": id, "work_number": Value::Null})).unwrap(),
            )
            .unwrap();
    }
    assert_eq!(store.get_all(Partition::WorkOrders).len(), 2);
}

#[test]
fn freeing_a_work_number_allows_reuse() {
    let mut store = Store::new();
    let first = Record::from_value(json!({"id": "a", "work_number": "00001"})).unwrap();
    store.put(Partition::WorkOrders, first).unwrap();
    store.delete(Partition::WorkOrders, "a");

    let second = Record::from_value(json!({"id": "b", "work_number": "00001"})).unwrap();
    assert!(store.put(Partition::WorkOrders, second).is_ok());
}

#[test]
fn wrong_marker_type_is_invalid() {
    let err = Record::from_value(json!({"id": "a", "_unsynced": "yes"})).unwrap_err();
    assert!(matches!(err, Error::InvalidRecord(_)));
}

#[test]
fn same_id_in_different_partitions_is_independent() {
    let mut store = Store::new();
    store.put(Partition::Clients, Record::new("x")).unwrap();
    store.put(Partition::Settings, Record::new("x")).unwrap();

    store.delete(Partition::Clients, "x");
    assert!(store.get(Partition::Clients, "x").is_none());
    assert!(store.get(Partition::Settings, "x").is_some());
}
