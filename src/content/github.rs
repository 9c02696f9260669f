//! GitHubContentStore - a JSON file in a GitHub repository.
//!
//! Requires the `github` feature. Talks to the REST "contents" endpoint of a
//! single file (`https://api.github.com/repos/{owner}/{repo}/contents/{path}`):
//!
//! - `GET` returns the file base64-encoded together with its blob `sha`,
//! - `PUT` with `{message, content, sha}` commits a new version, and is
//!   rejected with `409 Conflict` when `sha` is no longer the file's blob.
//!
//! The blob sha is used directly as the version token.
//!
//! ## Example
//!
//! ```ignore
//! use ghdb::{DocumentStore, GitHubConfig, GitHubContentStore};
//!
//! let config = GitHubConfig::new(
//!     "https://api.github.com/repos/acme/tickets/contents/db.json",
//!     token,
//! )
//! .branch("data");
//! let store = DocumentStore::new(GitHubContentStore::new(config)?);
//! let id = store.add(json!({ "title": "first" }))?;
//! ```

use std::env;
use std::fmt;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{ContentStore, Fetched, VersionToken};
use crate::error::{ContentError, StoreError};

/// Basic-auth user name sent with the token.
pub const DEFAULT_USER: &str = "gdb/1.1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("ghdb/", env!("CARGO_PKG_VERSION"));
const GITHUB_JSON: &str = "application/vnd.github+json";

/// Connection settings for one document file.
#[derive(Clone)]
pub struct GitHubConfig {
    /// Contents API URL of the file.
    pub url: String,
    pub token: String,
    pub user: String,
    /// Branch to read and commit to. The repository default when `None`.
    pub branch: Option<String>,
    pub timeout: Duration,
}

impl GitHubConfig {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        GitHubConfig {
            url: url.into(),
            token: token.into(),
            user: DEFAULT_USER.to_string(),
            branch: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `GHDB_URL` and `GHDB_TOKEN`, plus optional `GHDB_USER` and
    /// `GHDB_BRANCH`, from the process environment.
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| StoreError::Config(format!("{} is not set", name)))
        };

        let mut config = GitHubConfig::new(required("GHDB_URL")?, required("GHDB_TOKEN")?);
        if let Some(user) = lookup("GHDB_USER").filter(|v| !v.is_empty()) {
            config = config.user(user);
        }
        if let Some(branch) = lookup("GHDB_BRANCH").filter(|v| !v.is_empty()) {
            config = config.branch(branch);
        }
        Ok(config)
    }
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .field("branch", &self.branch)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
}

#[derive(Serialize)]
struct UpdateRequest<'a> {
    message: &'a str,
    content: String,
    sha: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

/// Content store backed by the GitHub contents API.
///
/// Uses a blocking client; call it from plain threads, not from inside an
/// async runtime.
pub struct GitHubContentStore {
    client: Client,
    config: GitHubConfig,
}

impl GitHubContentStore {
    pub fn new(config: GitHubConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Config(format!("http client: {}", e)))?;
        Ok(GitHubContentStore { client, config })
    }

    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .basic_auth(&self.config.user, Some(&self.config.token))
            .header(ACCEPT, GITHUB_JSON)
    }
}

impl ContentStore for GitHubContentStore {
    fn fetch(&self) -> Result<Fetched, ContentError> {
        let mut request = self.authorized(self.client.get(&self.config.url));
        if let Some(branch) = &self.config.branch {
            request = request.query(&[("ref", branch)]);
        }

        let response = request
            .send()
            .map_err(|e| ContentError::Unavailable(format!("GET {}: {}", self.config.url, e)))?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ContentError::Unavailable(format!(
                "GET {} returned {}",
                self.config.url, status
            )));
        }

        let body: ContentsResponse = response.json().map_err(|e| {
            ContentError::Unavailable(format!("GET {}: unexpected body: {}", self.config.url, e))
        })?;
        let document = decode_content(&body.content)?;
        debug!(target: "ghdb::content", url = %self.config.url, sha = %body.sha, "fetched github document");

        Ok(Fetched {
            document,
            version: VersionToken::new(body.sha),
        })
    }

    fn store(
        &self,
        document: &Value,
        version: &VersionToken,
        message: &str,
    ) -> Result<(), ContentError> {
        let body = UpdateRequest {
            message,
            content: encode_content(document)?,
            sha: version.as_str(),
            branch: self.config.branch.as_deref(),
        };

        let response = self
            .authorized(self.client.put(&self.config.url))
            .json(&body)
            .send()
            .map_err(|e| ContentError::Unavailable(format!("PUT {}: {}", self.config.url, e)))?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => {
                debug!(target: "ghdb::content", url = %self.config.url, commit = message, "stored github document");
                Ok(())
            }
            StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => {
                debug!(target: "ghdb::content", url = %self.config.url, sha = %version, "github rejected stale sha");
                Err(ContentError::Conflict)
            }
            status => Err(ContentError::Unavailable(format!(
                "PUT {} returned {}",
                self.config.url, status
            ))),
        }
    }
}

/// GitHub wraps the base64 payload at 60 columns.
fn decode_content(content: &str) -> Result<Value, ContentError> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| ContentError::Unavailable(format!("content is not base64: {}", e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ContentError::Unavailable(format!("content is not JSON: {}", e)))
}

fn encode_content(document: &Value) -> Result<String, ContentError> {
    let bytes =
        serde_json::to_vec(document).map_err(|e| ContentError::Unavailable(e.to_string()))?;
    Ok(STANDARD.encode(bytes))
}
