//! Upstream provider settings.

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Endpoint the runtime talks to when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Host serving the Gemini `generateContent` API.
pub const GEMINI_HOST: &str = "generativelanguage.googleapis.com";

/// Wire protocol spoken by the configured provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Speaks the Messages protocol natively; requests pass through.
    Anthropic,
    /// Gemini-style `generateContent`; requests are translated.
    Gemini,
}

impl ProviderKind {
    /// Infers the provider from its base URL.
    pub fn detect(base_url: &str) -> Self {
        let is_gemini = Url::parse(base_url)
            .ok()
            .and_then(|url| url.host_str().map(|host| host.eq_ignore_ascii_case(GEMINI_HOST)))
            .unwrap_or(false);

        if is_gemini { Self::Gemini } else { Self::Anthropic }
    }

    /// Whether calls to this provider must be rewritten to the native protocol.
    pub fn needs_translation(self) -> bool {
        matches!(self, Self::Gemini)
    }
}

/// Accessors the adapter uses to read the active provider configuration.
///
/// They are called for every intercepted request, so an implementation backed
/// by live application settings sees profile switches without rebuilding the
/// client.
pub trait ProviderSettings: Send + Sync {
    /// Base URL of the configured provider, without a trailing slash.
    fn configured_base_url(&self) -> String;

    /// API key for the configured provider, if any.
    fn api_key(&self) -> Option<SecretString>;

    /// Protocol spoken by the configured provider.
    fn kind(&self) -> ProviderKind {
        ProviderKind::detect(&self.configured_base_url())
    }
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Base URL of the provider. Defaults to [`DEFAULT_BASE_URL`].
    #[serde(default)]
    pub base_url: Option<Url>,

    /// API key sent upstream.
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Explicit provider kind. Inferred from `base_url` when omitted.
    #[serde(default)]
    pub kind: Option<ProviderKind>,
}

impl ProviderSettings for ProviderConfig {
    fn configured_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.as_str().trim_end_matches('/').to_string(),
            None => DEFAULT_BASE_URL.to_string(),
        }
    }

    fn api_key(&self) -> Option<SecretString> {
        self.api_key.clone()
    }

    fn kind(&self) -> ProviderKind {
        self.kind
            .unwrap_or_else(|| ProviderKind::detect(&self.configured_base_url()))
    }
}
