use std::{path::PathBuf, time::Duration};

use duration_str::deserialize_duration;
use serde::Deserialize;

/// Location and lifetime of the last-API-error slot.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ErrorCacheConfig {
    /// File shared by every process reporting errors. Falls back to the
    /// system temporary directory when unset.
    pub path: Option<PathBuf>,
    /// Age after which a stored error is considered stale.
    #[serde(deserialize_with = "deserialize_duration")]
    pub ttl: Duration,
}

impl Default for ErrorCacheConfig {
    fn default() -> Self {
        Self {
            path: None,
            ttl: Duration::from_secs(5 * 60),
        }
    }
}
