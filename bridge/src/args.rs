use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use config::Config;
use secrecy::SecretString;
use url::Url;

/// Sends Messages API requests, translating them for Gemini when the
/// configured provider needs it.
#[derive(Debug, Parser)]
#[command(name = "bridge", version, about)]
pub struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "BRIDGE_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Provider base URL, overriding the configuration file
    #[arg(long, env = "BRIDGE_BASE_URL", value_name = "URL")]
    pub base_url: Option<Url>,

    /// Provider API key, overriding the configuration file
    #[arg(long, env = "BRIDGE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Log filter, e.g. "info" or "interceptor=debug"
    #[arg(long, env = "BRIDGE_LOG", default_value = "info")]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send a Messages request body read from a file ("-" for stdin)
    Send {
        #[arg(value_name = "REQUEST")]
        request: PathBuf,
    },
    /// Print and clear the last recorded upstream API error
    LastError,
}

impl Args {
    /// Configuration from the file, if any, with command line overrides applied.
    pub fn config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                Config::load(path).with_context(|| format!("Failed to load configuration from {}", path.display()))?
            }
            None => Config::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.provider.base_url = Some(base_url.clone());
        }

        if let Some(api_key) = &self.api_key {
            config.provider.api_key = Some(SecretString::from(api_key.clone()));
        }

        Ok(config)
    }
}
