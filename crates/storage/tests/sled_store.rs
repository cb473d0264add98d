//! Sled store tests: dual-tree commits and durability across reopen.

use aggregator_storage::{RegistryStore, SledStore, StoreLocation};
use aggregator_types::{AggregatorRecord, Domain, Principal};
use tempfile::TempDir;

fn create_test_record(domain: &str, owner_byte: u8) -> AggregatorRecord {
    AggregatorRecord::new(
        Domain::new(domain),
        format!("did:web:{domain}"),
        format!("QmHash{owner_byte:03}"),
        Principal::new([owner_byte; 20]),
    )
}

#[test]
fn insert_writes_record_and_owner_index() {
    let dir = TempDir::new().expect("temp dir");
    let mut store = SledStore::new(dir.path().join("db")).expect("sled store");

    let record = create_test_record("duffel.xyz", 1);
    store.insert_record(&record).expect("insert");

    let stored = store
        .get_record(&record.domain)
        .expect("record lookup")
        .expect("record exists");
    assert_eq!(stored, record.by_domain());

    let indexed = store
        .domain_of(&record.owner)
        .expect("index lookup")
        .expect("index entry exists");
    assert_eq!(indexed, record.domain);
    assert_eq!(store.record_count().unwrap(), 1);
}

#[test]
fn missing_keys_report_none() {
    let dir = TempDir::new().expect("temp dir");
    let store = SledStore::new(dir.path().join("db")).expect("sled store");

    assert!(store
        .get_record(&Domain::new("unregistered.xyz"))
        .unwrap()
        .is_none());
    assert!(store.domain_of(&Principal::new([9u8; 20])).unwrap().is_none());
    assert_eq!(store.record_count().unwrap(), 0);
}

#[test]
fn sled_restart_restores_records_and_index() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("db");

    let first = create_test_record("duffel.xyz", 1);
    let second = create_test_record("other.xyz", 2);

    {
        let mut store = SledStore::new(&path).expect("sled store");
        store.insert_record(&first).unwrap();
        store.insert_record(&second).unwrap();
        store
            .update_descriptor(&first.domain, "did:web:updated.duffel.xyz", "QmHash002")
            .unwrap();
        store.flush().expect("flush");
    }

    let reopened = SledStore::new(&path).expect("reopen sled store");
    assert_eq!(reopened.record_count().unwrap(), 2);

    let stored = reopened.get_record(&first.domain).unwrap().unwrap();
    assert_eq!(stored.decentralized_id, "did:web:updated.duffel.xyz");
    assert_eq!(stored.content_pointer, "QmHash002");
    assert_eq!(stored.owner, first.owner);

    assert_eq!(
        reopened.domain_of(&second.owner).unwrap(),
        Some(second.domain.clone())
    );
    assert_eq!(
        reopened.location(),
        StoreLocation::Sled { path: path.clone() }
    );
}

#[test]
fn update_of_missing_record_leaves_store_untouched() {
    let dir = TempDir::new().expect("temp dir");
    let mut store = SledStore::new(dir.path().join("db")).expect("sled store");

    let err = store
        .update_descriptor(&Domain::new("missing.xyz"), "did", "cid")
        .unwrap_err();
    assert!(err.to_string().contains("missing.xyz"));
    assert_eq!(store.record_count().unwrap(), 0);
}
