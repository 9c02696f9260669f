//! Filter - the selector shared by find, update and remove.
//!
//! A filter is one of three shapes:
//!
//! - a single id, which must exist,
//! - a list of ids, all of which must exist,
//! - a predicate mapping field to expected value; zero matches is fine.
//!
//! Callers rarely build a [`Filter`] by hand. Operations accept anything that
//! implements [`IntoFilter`]:
//!
//! ```ignore
//! store.find(3)?;                              // ById
//! store.find([3, 4])?;                         // ByIds
//! store.find(json!({ "status": "open" }))?;    // ByPredicate
//! ```

mod into_filter;

use serde_json::{Number, Value};

use crate::document::{Record, Records};
use crate::error::StoreError;

pub use into_filter::IntoFilter;

/// Selects records in `data`.
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    ById(u64),
    ByIds(Vec<u64>),
    ByPredicate(Record),
}

impl Filter {
    /// Resolve to the ids this filter selects in `records`.
    ///
    /// Id filters fail with `NotFound` on the first missing id and select
    /// nothing in that case. Repeated ids are selected once, in the order they
    /// first appear. Predicate filters return matching ids in id order.
    pub fn resolve(&self, records: &Records) -> Result<Vec<u64>, StoreError> {
        match self {
            Filter::ById(id) => {
                require(records, *id)?;
                Ok(vec![*id])
            }
            Filter::ByIds(ids) => {
                let mut selected = Vec::with_capacity(ids.len());
                for id in ids {
                    require(records, *id)?;
                    if !selected.contains(id) {
                        selected.push(*id);
                    }
                }
                Ok(selected)
            }
            Filter::ByPredicate(predicate) => Ok(records
                .iter()
                .filter(|(_, record)| matches(predicate, record))
                .map(|(id, _)| *id)
                .collect()),
        }
    }

    /// Resolve and clone the selected records out of `records`.
    pub fn select(&self, records: &Records) -> Result<Records, StoreError> {
        let ids = self.resolve(records)?;
        Ok(ids
            .into_iter()
            .filter_map(|id| records.get(&id).map(|record| (id, record.clone())))
            .collect())
    }
}

fn require(records: &Records, id: u64) -> Result<(), StoreError> {
    if records.contains_key(&id) {
        Ok(())
    } else {
        Err(StoreError::NotFound { id })
    }
}

/// Every predicate field must be present in `record` with an equal value.
fn matches(predicate: &Record, record: &Record) -> bool {
    predicate.iter().all(|(field, expected)| {
        record
            .get(field)
            .is_some_and(|actual| values_equal(actual, expected))
    })
}

/// JSON equality where numbers compare by value, so `1` equals `1.0`.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| values_equal(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, a)| b.get(key).is_some_and(|b| values_equal(a, b)))
        }
        _ => a == b,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a == b;
    }
    if a.is_f64() || b.is_f64() {
        return a.as_f64() == b.as_f64();
    }
    // u64 above i64::MAX against a negative integer
    false
}
