//! A small document store over a single JSON file held in a versioned content
//! store, typically a file in a GitHub repository.
//!
//! The document carries its own schema (`config.keys`) and id counter; records
//! live under `data` keyed by auto-incremented integer ids. Every mutation is
//! a compare-and-swap against the version of the document it was computed
//! from, so concurrent writers never silently clobber each other.

mod content;
mod document;
mod error;
mod filter;
mod store;

pub use content::{
    Commit, ContentStore, Fetched, FileContentStore, InMemoryContentStore, VersionToken,
};
#[cfg(feature = "github")]
pub use content::{GitHubConfig, GitHubContentStore};
pub use document::{Config, Document, IntoRecord, Record, Records, Schema};
pub use error::{ContentError, Result, StoreError};
pub use filter::{Filter, IntoFilter};
pub use store::{DocumentStore, RetryPolicy};
