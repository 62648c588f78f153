//! Configuration for the Messages-to-Gemini bridge.

mod adapter;
mod error;
mod error_cache;
mod loader;
mod provider;

use std::path::Path;

use serde::Deserialize;

pub use adapter::AdapterConfig;
pub use error::Error;
pub use error_cache::ErrorCacheConfig;
pub use provider::{DEFAULT_BASE_URL, GEMINI_HOST, ProviderConfig, ProviderKind, ProviderSettings};

pub(crate) type Result<T> = std::result::Result<T, error::Error>;

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub adapter: AdapterConfig,
    #[serde(default)]
    pub error_cache: ErrorCacheConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Config> {
        loader::load(path)
    }
}
