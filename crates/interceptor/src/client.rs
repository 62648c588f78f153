use std::{ops::Deref, sync::Arc};

use axum::body::{Body, Bytes};
use config::{Config, ErrorCacheConfig, ProviderSettings};
use error_cache::ErrorCache;
use http::{
    HeaderValue, Method, Request, Response,
    header::{CONTENT_TYPE, HeaderName},
};
use secrecy::ExposeSecret;
use tower::{ServiceBuilder, ServiceExt as _};

use crate::{ClientError, HttpTransport, Intercept, InterceptLayer, default_http_client_builder};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// HTTP client for Messages calls with interception installed.
///
/// Requests sent through [`AdapterClient::send`] go through the interception
/// layer; everything else is available on the wrapped [`reqwest::Client`]
/// through `Deref`.
#[derive(Clone)]
pub struct AdapterClient {
    service: Intercept<HttpTransport>,
    client: reqwest::Client,
    provider: Arc<dyn ProviderSettings>,
    messages_path: String,
    error_cache: ErrorCache,
}

impl AdapterClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        Self::with_provider(Arc::new(config.provider.clone()), config)
    }

    /// Builds a client reading provider settings from `provider` on every call
    /// instead of from `config.provider`.
    pub fn with_provider(provider: Arc<dyn ProviderSettings>, config: &Config) -> Result<Self, ClientError> {
        let client = default_http_client_builder().build().map_err(ClientError::Build)?;

        let error_cache = open_error_cache(&config.error_cache);

        let service = ServiceBuilder::new()
            .layer(InterceptLayer::new(
                provider.clone(),
                &config.adapter,
                Some(error_cache.clone()),
            ))
            .service(HttpTransport::new(client.clone()));

        Ok(Self {
            service,
            client,
            provider,
            messages_path: config.adapter.messages_path.clone(),
            error_cache,
        })
    }

    pub fn messages_url(&self) -> String {
        format!("{}{}", self.provider.configured_base_url(), self.messages_path)
    }

    pub fn error_cache(&self) -> &ErrorCache {
        &self.error_cache
    }

    pub async fn send(&self, request: Request<Bytes>) -> Result<Response<Body>, ClientError> {
        let response = self.service.clone().oneshot(request).await?;
        Ok(response)
    }

    /// Posts a Messages request body to the configured endpoint, with the
    /// headers a Messages-compatible provider expects.
    pub async fn post_messages(&self, body: impl Into<Bytes>) -> Result<Response<Body>, ClientError> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(self.messages_url())
            .header(CONTENT_TYPE, "application/json")
            .header(HeaderName::from_static("anthropic-version"), ANTHROPIC_VERSION);

        if let Some(api_key) = self.provider.api_key()
            && let Ok(mut value) = HeaderValue::from_str(api_key.expose_secret())
        {
            value.set_sensitive(true);
            builder = builder.header(HeaderName::from_static("x-api-key"), value);
        }

        self.send(builder.body(body.into())?).await
    }
}

/// The error cache described by `config`, in the system temporary directory
/// unless a path is set.
pub fn open_error_cache(config: &ErrorCacheConfig) -> ErrorCache {
    match &config.path {
        Some(path) => ErrorCache::new(path),
        None => ErrorCache::in_temp_dir(),
    }
    .with_ttl(config.ttl)
}

impl Deref for AdapterClient {
    type Target = reqwest::Client;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}
