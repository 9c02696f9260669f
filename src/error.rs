use thiserror::Error;

/// Result alias for document store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by [`DocumentStore`](crate::DocumentStore) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The content store could not be read or written.
    #[error("content store unavailable: {0}")]
    Unavailable(String),

    /// A filter named an id that is not present in `data`.
    #[error("id {id} not found")]
    NotFound { id: u64 },

    /// `add` received a field that is not declared in `config.keys`.
    #[error("key {field} is not in config")]
    Schema { field: String },

    /// A filter or record argument had an unsupported shape.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A compare-and-swap write lost the race on every permitted attempt.
    #[error("concurrent write detected (gave up after {attempts} attempt(s))")]
    Conflict { attempts: u32 },

    /// The fetched blob does not have the `{config, data}` document shape.
    #[error("malformed document: {0}")]
    Malformed(String),

    /// Store configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Whether re-running the same operation may succeed without caller changes.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Errors reported by a [`ContentStore`](crate::ContentStore) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    /// The version token no longer matches the stored content.
    #[error("version token is stale")]
    Conflict,

    /// Transport, authentication, or I/O failure.
    #[error("{0}")]
    Unavailable(String),
}

impl From<ContentError> for StoreError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::Conflict => StoreError::Conflict { attempts: 1 },
            ContentError::Unavailable(message) => StoreError::Unavailable(message),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Malformed(err.to_string())
    }
}
