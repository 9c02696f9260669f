//! Content stores - where the document blob actually lives.
//!
//! A content store holds one JSON value and guards writes with an opaque
//! version token: [`ContentStore::store`] succeeds only if the token it is
//! given is still current. The document store is built on nothing else.
//!
//! Implementations:
//!
//! - [`InMemoryContentStore`] for tests and embedding,
//! - [`FileContentStore`] for a JSON file on local disk,
//! - `GitHubContentStore` (feature `github`) for a file in a GitHub repository.

mod file;
#[cfg(feature = "github")]
mod github;
mod in_memory;

use std::fmt;

use serde_json::Value;

use crate::error::ContentError;

pub use file::FileContentStore;
#[cfg(feature = "github")]
pub use github::{GitHubConfig, GitHubContentStore};
pub use in_memory::{Commit, InMemoryContentStore};

/// Identifies the stored content as of a fetch. Only equality is meaningful.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(token: impl Into<String>) -> Self {
        VersionToken(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fetched document together with the token needed to write it back.
#[derive(Clone, Debug, PartialEq)]
pub struct Fetched {
    pub document: Value,
    pub version: VersionToken,
}

/// Compare-and-swap storage for a single JSON document.
pub trait ContentStore: Send + Sync {
    /// Read the current document and its version token.
    fn fetch(&self) -> Result<Fetched, ContentError>;

    /// Replace the document iff `version` is still current.
    ///
    /// Returns `ContentError::Conflict` when another writer got there first.
    /// `message` describes the change (a commit message for git-backed stores).
    fn store(
        &self,
        document: &Value,
        version: &VersionToken,
        message: &str,
    ) -> Result<(), ContentError>;
}

impl<S: ContentStore + ?Sized> ContentStore for &S {
    fn fetch(&self) -> Result<Fetched, ContentError> {
        (**self).fetch()
    }

    fn store(
        &self,
        document: &Value,
        version: &VersionToken,
        message: &str,
    ) -> Result<(), ContentError> {
        (**self).store(document, version, message)
    }
}

impl<S: ContentStore + ?Sized> ContentStore for std::sync::Arc<S> {
    fn fetch(&self) -> Result<Fetched, ContentError> {
        (**self).fetch()
    }

    fn store(
        &self,
        document: &Value,
        version: &VersionToken,
        message: &str,
    ) -> Result<(), ContentError> {
        (**self).store(document, version, message)
    }
}

impl<S: ContentStore + ?Sized> ContentStore for Box<S> {
    fn fetch(&self) -> Result<Fetched, ContentError> {
        (**self).fetch()
    }

    fn store(
        &self,
        document: &Value,
        version: &VersionToken,
        message: &str,
    ) -> Result<(), ContentError> {
        (**self).store(document, version, message)
    }
}
