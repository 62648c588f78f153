use std::{convert::Infallible, fmt::Display, sync::Arc};

use axum::body::{Body, Bytes};
use config::ProviderSettings;
use error_cache::{ErrorCache, extract_error_message};
use http::{
    HeaderValue, Method, Request, Response, StatusCode,
    header::{CACHE_CONTROL, CONNECTION, CONTENT_TYPE},
};
use llm::{
    TranslationError,
    protocol::{
        anthropic::{
            error::{Error as ApiError, ErrorResponse},
            messages,
        },
        gemini::GenerateContentResponse,
    },
    provider::gemini::{API_KEY_HEADER, MISSING_API_KEY_MESSAGE, assemble, build_native_request, native_url},
    stream::SseFrame,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tower::ServiceExt as _;
use url::Url;

use crate::{debug_log::DebugLog, error::TranslatedCallError, mcp, observe};

/// Upper bound for a buffered native reply.
const NATIVE_BODY_LIMIT: usize = 32 * 1024 * 1024;

/// Per-client interception state shared by every [`crate::Intercept`] clone.
pub(crate) struct Dispatcher {
    pub(crate) provider: Arc<dyn ProviderSettings>,
    pub(crate) messages_path: String,
    /// Set when MCP metadata injection is enabled.
    pub(crate) mcp_tool_prefix: Option<String>,
    pub(crate) error_cache: Option<ErrorCache>,
    pub(crate) debug_log: Option<DebugLog>,
}

impl Dispatcher {
    pub(crate) async fn dispatch<S>(&self, next: S, request: Request<Bytes>) -> Result<Response<Body>, S::Error>
    where
        S: tower::Service<Request<Bytes>, Response = Response<Body>> + Clone + Send,
        S::Future: Send,
        S::Error: Display,
    {
        let url = request.uri().to_string();

        if let Some(debug_log) = &self.debug_log {
            debug_log.request(&request);
        }

        // Other calls are mirrored but never reach the error cache.
        if !self.is_messages_call(&request) {
            let response = next.oneshot(request).await?;
            return Ok(observe::observe(response, &url, None, self.debug_log.as_ref()));
        }

        let response = if self.provider.kind().needs_translation() {
            self.translate(next, request).await?
        } else {
            let request = match &self.mcp_tool_prefix {
                Some(prefix) => mcp::inject_metadata(request, prefix),
                None => request,
            };

            next.oneshot(request).await?
        };

        Ok(observe::observe(response, &url, self.error_cache.as_ref(), self.debug_log.as_ref()))
    }

    /// A POST with a body to `{configured_base_url}{messages_path}`. The query
    /// string and a trailing slash do not matter.
    fn is_messages_call(&self, request: &Request<Bytes>) -> bool {
        if request.method() != Method::POST || request.body().is_empty() {
            return false;
        }

        let endpoint = format!("{}{}", self.provider.configured_base_url(), self.messages_path);

        let (Ok(endpoint), Ok(target)) = (Url::parse(&endpoint), Url::parse(&request.uri().to_string())) else {
            return false;
        };

        endpoint.scheme() == target.scheme()
            && endpoint.host_str() == target.host_str()
            && endpoint.port_or_known_default() == target.port_or_known_default()
            && endpoint.path().trim_end_matches('/') == target.path().trim_end_matches('/')
    }

    async fn translate<S>(&self, next: S, request: Request<Bytes>) -> Result<Response<Body>, S::Error>
    where
        S: tower::Service<Request<Bytes>, Response = Response<Body>> + Clone + Send,
        S::Future: Send,
        S::Error: Display,
    {
        let Some(api_key) = self
            .provider
            .api_key()
            .filter(|key| !key.expose_secret().trim().is_empty())
        else {
            log::debug!("No API key configured for Gemini, rejecting {}", request.uri());

            let error = ApiError::authentication_error(MISSING_API_KEY_MESSAGE);
            return Ok(error_envelope(StatusCode::UNAUTHORIZED, error));
        };

        match self.translated_call(next.clone(), &request, &api_key).await {
            Ok(response) => Ok(response),
            Err(err) => {
                log::warn!("Gemini translation failed, forwarding the original request: {err}");
                next.oneshot(request).await
            }
        }
    }

    async fn translated_call<S>(
        &self,
        next: S,
        request: &Request<Bytes>,
        api_key: &SecretString,
    ) -> Result<Response<Body>, TranslatedCallError>
    where
        S: tower::Service<Request<Bytes>, Response = Response<Body>> + Send,
        S::Future: Send,
        S::Error: Display,
    {
        let messages_request = messages::Request::from_slice(request.body())?;
        let native = build_native_request(&messages_request);

        let url = native_url(&self.provider.configured_base_url(), &messages_request.model);

        let mut key = HeaderValue::from_str(api_key.expose_secret())?;
        key.set_sensitive(true);

        let native_request = Request::builder()
            .method(Method::POST)
            .uri(url.as_str())
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, key)
            .body(Bytes::from(native.to_vec()?))?;

        log::debug!("Calling Gemini at {url}");

        let response = next
            .oneshot(native_request)
            .await
            .map_err(|err| TranslatedCallError::Transport(err.to_string()))?;

        let (parts, body) = response.into_parts();

        let body = axum::body::to_bytes(body, NATIVE_BODY_LIMIT)
            .await
            .map_err(TranslatedCallError::Body)?;

        if !parts.status.is_success() {
            let text = String::from_utf8_lossy(&body);
            let message = extract_error_message(&text, parts.status.canonical_reason().unwrap_or_default());

            log::debug!("Gemini replied with status {}: {message}", parts.status);

            return Ok(error_envelope(parts.status, ApiError::for_status(parts.status.as_u16(), message)));
        }

        let native = GenerateContentResponse::from_slice(&body)?;
        let assembled = assemble(&native, &messages_request.model, messages_request.is_streaming())?;

        match assembled.frames {
            Some(frames) => Ok(event_stream(frames)?),
            None => json_response(StatusCode::OK, &assembled.message),
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Result<Response<Body>, TranslatedCallError> {
    let body = sonic_rs::to_vec(value).map_err(TranslationError::Serialization)?;

    let response = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body))?;

    Ok(response)
}

fn error_envelope(status: StatusCode, error: ApiError) -> Response<Body> {
    json_response(status, &ErrorResponse::from(error)).unwrap_or_else(|err| {
        log::error!("Failed to serialize error envelope: {err}");

        let mut response = Response::new(Body::empty());
        *response.status_mut() = status;
        response
    })
}

fn event_stream(frames: Vec<SseFrame>) -> Result<Response<Body>, http::Error> {
    let chunks = frames
        .into_iter()
        .map(|frame| Ok::<_, Infallible>(frame.to_string()));

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/event-stream")
        .header(CACHE_CONTROL, "no-cache")
        .header(CONNECTION, "keep-alive")
        .body(Body::from_stream(futures::stream::iter(chunks)))
}
