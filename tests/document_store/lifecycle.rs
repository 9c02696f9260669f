use serde_json::json;

use crate::support::seeded_tickets;

#[test]
fn clear_keeps_the_id_sequence() {
    let store = seeded_tickets();
    store.clear().unwrap();

    assert!(store.data().unwrap().is_empty());
    assert_eq!(store.config().unwrap().id_counter, 4);
    assert_eq!(store.add(json!({})).unwrap(), 4);
}

#[test]
fn reset_restarts_ids_at_one() {
    let store = seeded_tickets();
    store.reset().unwrap();

    assert!(store.data().unwrap().is_empty());
    assert_eq!(store.config().unwrap().id_counter, 1);
    assert_eq!(store.add(json!({})).unwrap(), 1);
}

#[test]
fn clear_and_reset_leave_the_schema_alone() {
    let store = seeded_tickets();
    let keys = store.keys().unwrap();

    store.clear().unwrap();
    assert_eq!(store.keys().unwrap(), keys);

    store.reset().unwrap();
    assert_eq!(store.keys().unwrap(), keys);
}

#[test]
fn every_operation_reads_the_latest_document() {
    let store = seeded_tickets();
    let other_process = store.content().clone();

    let mut document = other_process.snapshot().unwrap();
    document["data"]["3"]["status"] = json!("closed");
    other_process.seed(document);

    assert!(store.find(json!({ "status": "open" })).unwrap().contains_key(&1));
    assert!(!store.find(json!({ "status": "open" })).unwrap().contains_key(&3));
}

#[test]
fn reads_do_not_write() {
    let store = seeded_tickets();
    let revision = store.content().revision();

    store.find(1).unwrap();
    store.find(json!({})).unwrap();
    store.config().unwrap();
    store.keys().unwrap();
    store.data().unwrap();

    assert_eq!(store.content().revision(), revision);
}
