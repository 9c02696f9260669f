use super::{Config, Record};
use crate::error::StoreError;

/// Read-only view of `config.keys`, used to validate inserted records.
#[derive(Clone, Copy, Debug)]
pub struct Schema<'a> {
    keys: &'a Record,
}

impl<'a> Schema<'a> {
    pub fn new(config: &'a Config) -> Self {
        Schema { keys: &config.keys }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.keys.contains_key(field)
    }

    /// Insert the configured default for every declared field `record` lacks.
    /// Fields already present are left alone.
    pub fn fill_defaults(&self, record: &mut Record) {
        for (field, default) in self.keys {
            if !record.contains_key(field) {
                record.insert(field.clone(), default.clone());
            }
        }
    }

    /// Fail on the first field that the schema does not declare.
    pub fn check(&self, record: &Record) -> Result<(), StoreError> {
        match record.keys().find(|field| !self.contains(field)) {
            Some(field) => Err(StoreError::Schema {
                field: field.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Fill defaults, then check membership. Returns the completed record.
    pub fn conform(&self, mut record: Record) -> Result<Record, StoreError> {
        self.fill_defaults(&mut record);
        self.check(&record)?;
        Ok(record)
    }
}
