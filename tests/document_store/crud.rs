use ghdb::StoreError;
use serde_json::{json, Value};

use crate::support::{seeded_tickets, tickets};

#[test]
fn add_then_find_round_trips_with_defaults() {
    let store = tickets();
    let id = store.add(json!({ "title": "crash on save" })).unwrap();

    let found = store.find(id).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(
        Value::Object(found[&id].clone()),
        json!({ "title": "crash on save", "status": "open", "assignee": null })
    );
}

#[test]
fn add_with_every_field_keeps_caller_values() {
    let store = tickets();
    let id = store
        .add(json!({ "title": "t", "status": "closed", "assignee": "cy" }))
        .unwrap();
    let record = &store.find(id).unwrap()[&id];
    assert_eq!(record["status"], json!("closed"));
    assert_eq!(record["assignee"], json!("cy"));
}

#[test]
fn add_with_unknown_field_changes_nothing() {
    let store = seeded_tickets();
    let before = store.content().snapshot();

    let err = store
        .add(json!({ "title": "x", "priority": "high" }))
        .unwrap_err();

    assert_eq!(
        err,
        StoreError::Schema {
            field: "priority".into()
        }
    );
    assert_eq!(store.content().snapshot(), before);
    assert_eq!(store.config().unwrap().id_counter, 4);
    assert_eq!(store.data().unwrap().len(), 3);
}

#[test]
fn ids_increase_and_are_never_reused() {
    let store = tickets();
    let first = store.add(json!({})).unwrap();
    let second = store.add(json!({})).unwrap();
    assert_eq!((first, second), (1, 2));

    store.remove(second).unwrap();
    let third = store.add(json!({})).unwrap();
    assert_eq!(third, 3);

    let ids: Vec<u64> = store.data().unwrap().keys().copied().collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn update_merges_into_selected_record() {
    let store = seeded_tickets();
    let updated = store.update(1, json!({ "status": "closed" })).unwrap();
    assert_eq!(updated, vec![1]);

    let record = &store.find(1).unwrap()[&1];
    assert_eq!(record["status"], json!("closed"));
    assert_eq!(record["title"], json!("login broken"));
    assert_eq!(record["assignee"], json!("ana"));
}

#[test]
fn update_by_predicate_touches_every_match() {
    let store = seeded_tickets();
    let updated = store
        .update(json!({ "assignee": "ana" }), json!({ "assignee": "dee" }))
        .unwrap();
    assert_eq!(updated, vec![1, 2]);

    assert_eq!(store.find(json!({ "assignee": "dee" })).unwrap().len(), 2);
    assert!(store.find(json!({ "assignee": "ana" })).unwrap().is_empty());
}

// `update` does not apply the schema check `add` applies: fields outside
// config.keys are merged as given.
#[test]
fn update_accepts_fields_outside_the_schema() {
    let store = seeded_tickets();
    store.update(3, json!({ "priority": "high" })).unwrap();

    let record = &store.find(3).unwrap()[&3];
    assert_eq!(record["priority"], json!("high"));
    assert!(!store.keys().unwrap().contains_key("priority"));
}

#[test]
fn update_with_missing_id_in_list_writes_nothing() {
    let store = seeded_tickets();
    let revision = store.content().revision();

    let err = store
        .update([1, 9], json!({ "status": "closed" }))
        .unwrap_err();

    assert_eq!(err, StoreError::NotFound { id: 9 });
    assert_eq!(store.content().revision(), revision);
    assert_eq!(store.find(1).unwrap()[&1]["status"], json!("open"));
}

#[test]
fn remove_by_id_list() {
    let store = seeded_tickets();
    let removed = store.remove(vec![3, 1]).unwrap();
    assert_eq!(removed, vec![3, 1]);

    let ids: Vec<u64> = store.data().unwrap().keys().copied().collect();
    assert_eq!(ids, vec![2]);
}

#[test]
fn remove_with_missing_id_in_list_removes_nothing() {
    let store = seeded_tickets();

    let err = store.remove([2, 5]).unwrap_err();

    assert_eq!(err, StoreError::NotFound { id: 5 });
    assert_eq!(store.data().unwrap().len(), 3);
}

#[test]
fn remove_by_predicate_with_no_match_is_ok() {
    let store = seeded_tickets();
    let removed = store.remove(json!({ "status": "archived" })).unwrap();
    assert!(removed.is_empty());
    assert_eq!(store.data().unwrap().len(), 3);
}

#[test]
fn remove_missing_single_id_is_not_found() {
    let store = seeded_tickets();
    assert_eq!(
        store.remove(42).unwrap_err(),
        StoreError::NotFound { id: 42 }
    );
}
