//! Single-slot, file-backed store for the most recent upstream API error.
//!
//! Higher layers of an SDK tend to wrap provider failures into generic errors,
//! losing the HTTP status and the provider message. The interception layer
//! records the raw failure here and a UI, possibly running in another process,
//! pops it when it renders the error.
//!
//! The slot is one JSON file. Writers replace it atomically (temporary file and
//! rename), readers delete it on every read, and values older than the TTL are
//! treated as absent. There is no locking: concurrent writers resolve to
//! last-write-wins and a write racing a read may lose one report, but the file
//! is never observed half-written.

mod error;

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use error::Error;

/// Default lifetime of a stored error.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// File name used when no explicit path is configured.
pub const DEFAULT_FILE_NAME: &str = "bridge-last-api-error.json";

/// Upstream failure as persisted on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredApiError {
    pub status: u16,
    pub status_text: String,
    pub message: String,
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
}

impl StoredApiError {
    fn is_expired(&self, now_ms: i64, ttl: Duration) -> bool {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        now_ms.saturating_sub(self.timestamp) > ttl_ms
    }
}

#[derive(Debug, Clone)]
pub struct ErrorCache {
    path: PathBuf,
    ttl: Duration,
}

impl ErrorCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ttl: DEFAULT_TTL,
        }
    }

    /// Cache stored in the system temporary directory.
    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir().join(DEFAULT_FILE_NAME))
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stores an upstream failure, replacing whatever was pending.
    pub fn record(&self, status: u16, status_text: &str, message: &str) -> Result<(), Error> {
        self.store(&StoredApiError {
            status,
            status_text: status_text.to_string(),
            message: message.to_string(),
            timestamp: now_ms(),
        })
    }

    pub fn store(&self, error: &StoredApiError) -> Result<(), Error> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        std::fs::create_dir_all(dir)?;

        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut file, error)?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|err| Error::Io(err.error))?;

        Ok(())
    }

    /// Returns the pending error, if fresh, and clears the slot.
    ///
    /// The file is removed whether or not the value is returned, so a given
    /// error is observed by at most one reader.
    pub fn peek_and_clear(&self) -> Option<StoredApiError> {
        let contents = match std::fs::read(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return None,
            Err(err) => {
                log::debug!("Failed to read error cache at {}: {err}", self.path.display());
                return None;
            }
        };

        if let Err(err) = std::fs::remove_file(&self.path)
            && err.kind() != ErrorKind::NotFound
        {
            log::debug!("Failed to clear error cache at {}: {err}", self.path.display());
        }

        let stored: StoredApiError = match serde_json::from_slice(&contents) {
            Ok(stored) => stored,
            Err(err) => {
                log::debug!("Discarding unreadable error cache entry: {err}");
                return None;
            }
        };

        if stored.is_expired(now_ms(), self.ttl) {
            log::debug!("Discarding stale error cache entry for status {}", stored.status);
            return None;
        }

        Some(stored)
    }
}

/// Best human-readable message for an error response body.
///
/// Looks for `error.message` in a JSON envelope, then a top-level `message`,
/// then falls back to the raw text and finally to the status text.
pub fn extract_error_message(body: &str, status_text: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let message = match &value {
            Value::Object(map) => match map.get("error") {
                Some(Value::Object(error)) => error.get("message").and_then(Value::as_str),
                Some(Value::String(message)) => Some(message.as_str()),
                _ => map.get("message").and_then(Value::as_str),
            },
            _ => None,
        };

        if let Some(message) = message.filter(|message| !message.trim().is_empty()) {
            return message.to_string();
        }
    }

    if body.trim().is_empty() {
        status_text.to_string()
    } else {
        body.to_string()
    }
}

fn now_ms() -> i64 {
    jiff::Timestamp::now().as_millisecond()
}
