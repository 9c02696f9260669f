//! DocumentStore - schema-checked CRUD over one versioned document.
//!
//! Every operation starts from a fresh fetch; nothing is cached between calls.
//! Mutations compute the next document from that fetch and write it back with
//! the fetch's version token, so a concurrent writer is never overwritten:
//! the losing write is rejected, and the whole cycle is re-run up to the
//! [`RetryPolicy`] limit.
//!
//! ## Example
//!
//! ```ignore
//! use ghdb::{DocumentStore, InMemoryContentStore};
//!
//! let store = DocumentStore::new(InMemoryContentStore::new(json!({
//!     "config": { "keys": { "title": "", "status": "open" }, "id_counter": 1 },
//!     "data": {}
//! })));
//!
//! let id = store.add(json!({ "title": "write docs" }))?;
//! store.update(id, json!({ "status": "done" }))?;
//! let open = store.find(json!({ "status": "open" }))?;
//! ```

mod retry;

use tracing::{debug, warn};

use crate::content::{ContentStore, Fetched, VersionToken};
use crate::document::{Config, Document, IntoRecord, Record, Records};
use crate::error::{ContentError, Result, StoreError};
use crate::filter::IntoFilter;

pub use retry::RetryPolicy;

pub struct DocumentStore<S> {
    content: S,
    retry: RetryPolicy,
}

impl<S: ContentStore> DocumentStore<S> {
    pub fn new(content: S) -> Self {
        DocumentStore {
            content,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn content(&self) -> &S {
        &self.content
    }

    pub fn into_inner(self) -> S {
        self.content
    }

    /// Insert `data` as a new record and return its id.
    ///
    /// Fields missing from `data` take their configured defaults. A field not
    /// declared in `config.keys` fails with `Schema` and nothing is written.
    pub fn add(&self, data: impl IntoRecord) -> Result<u64> {
        let data = data.into_record()?;
        self.mutate("add", |document| {
            let record = document.schema().conform(data.clone())?;
            let id = document.allocate_id()?;
            document.data.insert(id, record);
            Ok((id, format!("add record {}", id)))
        })
    }

    /// Records selected by `filter`, keyed by id.
    pub fn find(&self, filter: impl IntoFilter) -> Result<Records> {
        let filter = filter.into_filter()?;
        let document = self.read()?;
        let found = filter.select(&document.data)?;
        debug!(target: "ghdb::store", matched = found.len(), "find");
        Ok(found)
    }

    /// Merge `new_data` into every record selected by `filter` and return the
    /// updated ids.
    ///
    /// Fields are overwritten or added. Unlike `add`, the fields are not
    /// checked against `config.keys`.
    pub fn update(&self, filter: impl IntoFilter, new_data: impl IntoRecord) -> Result<Vec<u64>> {
        let filter = filter.into_filter()?;
        let new_data = new_data.into_record()?;
        self.mutate("update", |document| {
            let ids = filter.resolve(&document.data)?;
            for id in &ids {
                if let Some(record) = document.data.get_mut(id) {
                    record.extend(new_data.clone());
                }
            }
            let message = format!("update {}", describe(&ids));
            Ok((ids, message))
        })
    }

    /// Delete every record selected by `filter` and return the removed ids.
    /// Removed ids are never handed out again.
    pub fn remove(&self, filter: impl IntoFilter) -> Result<Vec<u64>> {
        let filter = filter.into_filter()?;
        self.mutate("remove", |document| {
            let ids = filter.resolve(&document.data)?;
            for id in &ids {
                document.data.remove(id);
            }
            let message = format!("remove {}", describe(&ids));
            Ok((ids, message))
        })
    }

    /// Delete all records. `id_counter` keeps counting from where it was.
    pub fn clear(&self) -> Result<()> {
        self.mutate("clear", |document| {
            document.data.clear();
            Ok(((), "clear data".to_string()))
        })
    }

    /// Delete all records and restart ids at 1.
    pub fn reset(&self) -> Result<()> {
        self.mutate("reset", |document| {
            document.data.clear();
            document.config.id_counter = 1;
            Ok(((), "reset store".to_string()))
        })
    }

    pub fn config(&self) -> Result<Config> {
        Ok(self.read()?.config)
    }

    /// The schema: permitted fields and their defaults.
    pub fn keys(&self) -> Result<Record> {
        Ok(self.read()?.config.keys)
    }

    pub fn data(&self) -> Result<Records> {
        Ok(self.read()?.data)
    }

    fn load(&self) -> Result<(Document, VersionToken)> {
        let Fetched { document, version } = self.content.fetch()?;
        Ok((Document::from_value(document)?, version))
    }

    fn read(&self) -> Result<Document> {
        self.load().map(|(document, _)| document)
    }

    /// Fetch, apply, and write back under the fetched version token.
    ///
    /// `apply` returns the operation's output and the commit message. It runs
    /// against a fresh copy on every attempt; an error from it aborts the
    /// operation before anything is written.
    fn mutate<T, F>(&self, operation: &'static str, mut apply: F) -> Result<T>
    where
        F: FnMut(&mut Document) -> Result<(T, String)>,
    {
        let mut attempt = 1;
        loop {
            let (mut document, version) = self.load()?;
            let (output, message) = apply(&mut document)?;
            let value = document.to_value()?;

            match self.content.store(&value, &version, &message) {
                Ok(()) => {
                    debug!(target: "ghdb::store", operation, attempt, commit = %message, "committed");
                    return Ok(output);
                }
                Err(ContentError::Conflict) if self.retry.allows_retry_after(attempt) => {
                    warn!(target: "ghdb::store", operation, attempt, "write conflict, retrying");
                    attempt += 1;
                }
                Err(ContentError::Conflict) => {
                    warn!(target: "ghdb::store", operation, attempt, "write conflict, giving up");
                    return Err(StoreError::Conflict { attempts: attempt });
                }
                Err(ContentError::Unavailable(reason)) => {
                    return Err(StoreError::Unavailable(reason));
                }
            }
        }
    }
}

fn describe(ids: &[u64]) -> String {
    match ids {
        [] => "no records".to_string(),
        [id] => format!("record {}", id),
        _ => {
            let list: Vec<String> = ids.iter().map(u64::to_string).collect();
            format!("records {}", list.join(", "))
        }
    }
}
