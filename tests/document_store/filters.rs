use ghdb::{Filter, StoreError};
use serde_json::json;

use crate::support::{record, seeded_tickets};

#[test]
fn single_id_returns_singleton() {
    let store = seeded_tickets();
    let found = store.find(2).unwrap();
    assert_eq!(found.keys().copied().collect::<Vec<_>>(), vec![2]);
    assert_eq!(found[&2]["title"], json!("typo"));
}

#[test]
fn singleton_serializes_with_string_id() {
    let store = seeded_tickets();
    let found = store.find(2).unwrap();
    let value = serde_json::to_value(&found).unwrap();
    assert_eq!(value["2"]["status"], json!("closed"));
}

#[test]
fn id_list_returns_all_named() {
    let store = seeded_tickets();
    let found = store.find([1, 3]).unwrap();
    assert_eq!(found.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
}

#[test]
fn id_list_with_a_missing_id_returns_nothing() {
    let store = seeded_tickets();
    let result = store.find([1, 4]);
    assert_eq!(result.unwrap_err(), StoreError::NotFound { id: 4 });
}

#[test]
fn predicate_returns_exact_matches() {
    let store = seeded_tickets();
    let open = store.find(json!({ "status": "open" })).unwrap();
    assert_eq!(open.keys().copied().collect::<Vec<_>>(), vec![1, 3]);

    let ana_open = store
        .find(record(json!({ "status": "open", "assignee": "ana" })))
        .unwrap();
    assert_eq!(ana_open.keys().copied().collect::<Vec<_>>(), vec![1]);
}

#[test]
fn predicate_with_no_matches_is_empty() {
    let store = seeded_tickets();
    assert!(store
        .find(json!({ "status": "wontfix" }))
        .unwrap()
        .is_empty());
}

#[test]
fn predicate_on_undeclared_field_matches_nothing() {
    let store = seeded_tickets();
    assert!(store.find(json!({ "priority": null })).unwrap().is_empty());
}

#[test]
fn explicit_filter_values_work() {
    let store = seeded_tickets();
    assert_eq!(store.find(Filter::ById(3)).unwrap().len(), 1);
    assert_eq!(store.find(&Filter::ByIds(vec![1, 2])).unwrap().len(), 2);
}

#[test]
fn unsupported_shapes_are_invalid_arguments() {
    let store = seeded_tickets();
    for filter in [json!("1"), json!(null), json!(2.5), json!([1, {}])] {
        assert!(matches!(
            store.find(&filter).unwrap_err(),
            StoreError::InvalidArgument(_)
        ));
        assert!(matches!(
            store.remove(&filter).unwrap_err(),
            StoreError::InvalidArgument(_)
        ));
    }
    assert!(matches!(
        store.update(-1, json!({})).unwrap_err(),
        StoreError::InvalidArgument(_)
    ));
    assert_eq!(store.data().unwrap().len(), 3);
}

#[test]
fn predicate_numbers_match_across_int_and_float() {
    let store = seeded_tickets();
    store.update(2, json!({ "points": 3 })).unwrap();

    let found = store.find(json!({ "points": 3.0 })).unwrap();
    assert_eq!(found.keys().copied().collect::<Vec<_>>(), vec![2]);

    let removed = store.remove(json!({ "points": 3.0 })).unwrap();
    assert_eq!(removed, vec![2]);
    assert_eq!(store.data().unwrap().len(), 2);
}
