//! InMemoryContentStore - RwLock-backed content store for testing and embedding.

use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::debug;

use super::{ContentStore, Fetched, VersionToken};
use crate::document::Document;
use crate::error::{ContentError, StoreError};

/// One accepted write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    pub revision: u64,
    pub message: String,
}

#[derive(Default)]
struct State {
    document: Option<Value>,
    revision: u64,
    history: Vec<Commit>,
}

/// In-memory content store. The version token is a revision number bumped on
/// every accepted write.
///
/// Clone-friendly via Arc: clones share the same document, which is how tests
/// model several processes writing to one remote file.
#[derive(Clone, Default)]
pub struct InMemoryContentStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryContentStore {
    /// A store with no document. Every fetch fails until one is seeded.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A store holding `document` at revision 1.
    pub fn new(document: Value) -> Self {
        let store = Self::empty();
        store.seed(document);
        store
    }

    /// A store holding `document` serialized to its wire shape.
    pub fn with_document(document: &Document) -> Result<Self, StoreError> {
        Ok(Self::new(document.to_value()?))
    }

    /// Overwrite the document without a version check, bumping the revision.
    pub fn seed(&self, document: Value) {
        let mut state = match self.state.write() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.revision += 1;
        state.document = Some(document);
    }

    /// The current document, if any.
    pub fn snapshot(&self) -> Option<Value> {
        self.state.read().ok().and_then(|s| s.document.clone())
    }

    pub fn revision(&self) -> u64 {
        self.state.read().map(|s| s.revision).unwrap_or_default()
    }

    /// Accepted writes, oldest first. Seeding is not recorded.
    pub fn history(&self) -> Vec<Commit> {
        self.state
            .read()
            .map(|s| s.history.clone())
            .unwrap_or_default()
    }
}

impl ContentStore for InMemoryContentStore {
    fn fetch(&self) -> Result<Fetched, ContentError> {
        let state = self
            .state
            .read()
            .map_err(|_| ContentError::Unavailable("lock poisoned".into()))?;

        let document = state
            .document
            .clone()
            .ok_or_else(|| ContentError::Unavailable("no document".into()))?;

        debug!(target: "ghdb::content", revision = state.revision, "fetched in-memory document");
        Ok(Fetched {
            document,
            version: VersionToken::new(state.revision.to_string()),
        })
    }

    fn store(
        &self,
        document: &Value,
        version: &VersionToken,
        message: &str,
    ) -> Result<(), ContentError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| ContentError::Unavailable("lock poisoned".into()))?;

        if state.document.is_none() {
            return Err(ContentError::Unavailable("no document".into()));
        }
        if version.as_str() != state.revision.to_string() {
            debug!(
                target: "ghdb::content",
                expected = %version,
                actual = state.revision,
                "rejected stale in-memory write"
            );
            return Err(ContentError::Conflict);
        }

        state.revision += 1;
        state.document = Some(document.clone());
        let revision = state.revision;
        state.history.push(Commit {
            revision,
            message: message.to_string(),
        });
        debug!(target: "ghdb::content", revision, commit = message, "stored in-memory document");
        Ok(())
    }
}
