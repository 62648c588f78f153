use std::path::Path;

use crate::{Config, Error, ProviderSettings};

pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let config: Config = toml::from_str(&content)?;

    validate(&config)?;

    if config.provider.kind().needs_translation() && config.provider.api_key.is_none() {
        log::warn!("Gemini provider configured without an API key, translated requests will be rejected");
    }

    Ok(config)
}

pub(crate) fn validate(config: &Config) -> crate::Result<()> {
    if !config.adapter.messages_path.starts_with('/') {
        return Err(Error::Invalid(format!(
            "adapter.messages_path must start with '/', got '{}'",
            config.adapter.messages_path
        )));
    }

    if config.adapter.inject_mcp_metadata && config.adapter.mcp_tool_prefix.is_empty() {
        return Err(Error::Invalid(
            "adapter.mcp_tool_prefix cannot be empty when inject_mcp_metadata is enabled".to_string(),
        ));
    }

    if let Some(url) = &config.provider.base_url
        && !matches!(url.scheme(), "http" | "https")
    {
        return Err(Error::Invalid(format!(
            "provider.base_url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    Ok(())
}
