//! FileContentStore - a JSON file on local disk.
//!
//! The version token is the sha-256 of the file bytes, so an edit made by any
//! other process invalidates outstanding tokens. The check-then-write in
//! `store` is serialized within this process only. Each write goes through
//! its own uniquely named temporary file next to the document.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::debug;

use super::{ContentStore, Fetched, VersionToken};
use crate::error::ContentError;

pub struct FileContentStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileContentStore {
    /// Open an existing document file. The file is not read until the first fetch.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileContentStore {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Write `document` to a new file at `path`. Fails if the file exists.
    pub fn create(path: impl Into<PathBuf>, document: &Value) -> Result<Self, ContentError> {
        let store = Self::new(path);
        let bytes = encode(document)?;
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&store.path)
            .map_err(|e| io_error(&store.path, e))?;
        file.write_all(&bytes)
            .map_err(|e| io_error(&store.path, e))?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<u8>, ContentError> {
        fs::read(&self.path).map_err(|e| io_error(&self.path, e))
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Write `bytes` to a fresh temporary file and rename it over the document.
    fn replace(&self, bytes: &[u8]) -> Result<(), ContentError> {
        let dir = self.dir();
        let mut temp = NamedTempFile::new_in(dir).map_err(|e| io_error(dir, e))?;
        temp.write_all(bytes)
            .map_err(|e| io_error(temp.path(), e))?;
        temp.persist(&self.path)
            .map_err(|e| io_error(&self.path, e.error))?;
        Ok(())
    }
}

impl ContentStore for FileContentStore {
    fn fetch(&self) -> Result<Fetched, ContentError> {
        let bytes = self.read()?;
        let document: Value = serde_json::from_slice(&bytes).map_err(|e| {
            ContentError::Unavailable(format!("{} is not valid JSON: {}", self.path.display(), e))
        })?;
        let version = fingerprint(&bytes);
        debug!(target: "ghdb::content", path = %self.path.display(), %version, "fetched file document");
        Ok(Fetched { document, version })
    }

    fn store(
        &self,
        document: &Value,
        version: &VersionToken,
        message: &str,
    ) -> Result<(), ContentError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| ContentError::Unavailable("lock poisoned".into()))?;

        let current = fingerprint(&self.read()?);
        if &current != version {
            debug!(
                target: "ghdb::content",
                path = %self.path.display(),
                expected = %version,
                actual = %current,
                "rejected stale file write"
            );
            return Err(ContentError::Conflict);
        }

        self.replace(&encode(document)?)?;
        debug!(target: "ghdb::content", path = %self.path.display(), commit = message, "stored file document");
        Ok(())
    }
}

fn encode(document: &Value) -> Result<Vec<u8>, ContentError> {
    let mut bytes = serde_json::to_vec_pretty(document)
        .map_err(|e| ContentError::Unavailable(e.to_string()))?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn fingerprint(bytes: &[u8]) -> VersionToken {
    VersionToken::new(format!("{:x}", Sha256::digest(bytes)))
}

fn io_error(path: &Path, err: io::Error) -> ContentError {
    ContentError::Unavailable(format!("{}: {}", path.display(), err))
}
