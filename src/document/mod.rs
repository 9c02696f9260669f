//! Document - the single persisted value behind a store.
//!
//! The wire shape is fixed:
//!
//! ```text
//! {
//!   "config": { "keys": { <field>: <default>, ... }, "id_counter": <int> },
//!   "data":   { "<id>": { <field>: <value>, ... }, ... }
//! }
//! ```
//!
//! Ids are decimal strings on the wire and `u64` in memory. Because ids are
//! handed out in increasing order, iterating [`Records`] by id matches
//! insertion order.

mod schema;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;

pub use schema::Schema;

/// One stored item: field name to value.
pub type Record = Map<String, Value>;

/// The `data` section: id to record.
pub type Records = BTreeMap<u64, Record>;

/// The `config` section: schema and id allocation state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Permitted fields and their defaults.
    pub keys: Record,
    /// Next id to assign.
    pub id_counter: u64,
    /// Unrecognised fields, carried through write-backs untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The whole persisted state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub config: Config,
    #[serde(with = "records_serde")]
    pub data: Records,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    /// An empty document declaring `keys` as its schema, with ids starting at 1.
    pub fn new(keys: Record) -> Self {
        Document {
            config: Config {
                keys,
                id_counter: 1,
                extra: Map::new(),
            },
            data: Records::new(),
            extra: Map::new(),
        }
    }

    /// Parse a fetched blob. Anything that is not the `{config, data}` shape is
    /// rejected as malformed.
    pub fn from_value(value: Value) -> Result<Self, StoreError> {
        serde_json::from_value(value).map_err(|e| StoreError::Malformed(e.to_string()))
    }

    pub fn to_value(&self) -> Result<Value, StoreError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn schema(&self) -> Schema<'_> {
        Schema::new(&self.config)
    }

    /// Take the next id from `id_counter` and bump the counter.
    ///
    /// Fails if the counter points at an id that is already in use, which
    /// only happens when the remote document was edited by hand.
    pub(crate) fn allocate_id(&mut self) -> Result<u64, StoreError> {
        let id = self.config.id_counter;
        if self.data.contains_key(&id) {
            return Err(StoreError::Malformed(format!(
                "id_counter {} collides with an existing record",
                id
            )));
        }
        self.config.id_counter = id
            .checked_add(1)
            .ok_or_else(|| StoreError::Malformed("id_counter overflow".into()))?;
        Ok(id)
    }
}

/// Types that can be used as record arguments to `add` and `update`.
pub trait IntoRecord {
    fn into_record(self) -> Result<Record, StoreError>;
}

impl IntoRecord for Record {
    fn into_record(self) -> Result<Record, StoreError> {
        Ok(self)
    }
}

impl IntoRecord for &Record {
    fn into_record(self) -> Result<Record, StoreError> {
        Ok(self.clone())
    }
}

impl IntoRecord for Value {
    fn into_record(self) -> Result<Record, StoreError> {
        match self {
            Value::Object(record) => Ok(record),
            other => Err(StoreError::InvalidArgument(format!(
                "record must be a field mapping, got {}",
                other
            ))),
        }
    }
}

impl IntoRecord for &Value {
    fn into_record(self) -> Result<Record, StoreError> {
        self.clone().into_record()
    }
}

mod records_serde {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::{Map, Value};

    use super::Records;

    pub fn serialize<S>(records: &Records, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(records.iter().map(|(id, record)| (id.to_string(), record)))
    }

    // Ids are parsed by hand: a flattened parent buffers the map, and the
    // buffered form only hands out string keys.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Records, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        let mut records = Records::new();
        for (key, value) in raw {
            let id = key
                .parse::<u64>()
                .ok()
                .filter(|id| id.to_string() == key)
                .ok_or_else(|| D::Error::custom(format!("invalid record id {:?}", key)))?;
            let record = match value {
                Value::Object(record) => record,
                other => {
                    return Err(D::Error::custom(format!(
                        "record {} is not an object: {}",
                        key, other
                    )))
                }
            };
            records.insert(id, record);
        }
        Ok(records)
    }
}
