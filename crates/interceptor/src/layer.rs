use std::{
    fmt::Display,
    sync::Arc,
    task::{Context, Poll},
};

use axum::body::{Body, Bytes};
use config::{AdapterConfig, ProviderSettings};
use error_cache::ErrorCache;
use futures::future::BoxFuture;
use http::{Request, Response};
use tower::Layer;

use crate::{debug_log::DebugLog, dispatch::Dispatcher};

/// Installs Messages interception in front of a network service.
#[derive(Clone)]
pub struct InterceptLayer(Arc<Dispatcher>);

impl InterceptLayer {
    /// `provider` is consulted on every call, so provider switches apply to
    /// the next request. Upstream failures on the Messages endpoint are
    /// recorded in `error_cache` when one is given.
    pub fn new(provider: Arc<dyn ProviderSettings>, adapter: &AdapterConfig, error_cache: Option<ErrorCache>) -> Self {
        let mcp_tool_prefix = adapter
            .inject_mcp_metadata
            .then(|| adapter.mcp_tool_prefix.clone())
            .filter(|prefix| !prefix.is_empty());

        Self(Arc::new(Dispatcher {
            provider,
            messages_path: adapter.messages_path.clone(),
            mcp_tool_prefix,
            error_cache,
            debug_log: adapter.debug_log.clone().map(DebugLog::new),
        }))
    }
}

impl<Service> Layer<Service> for InterceptLayer
where
    Service: Send + Clone,
{
    type Service = Intercept<Service>;

    fn layer(&self, next: Service) -> Self::Service {
        Intercept {
            next,
            dispatcher: self.0.clone(),
        }
    }
}

/// Service produced by [`InterceptLayer`].
#[derive(Clone)]
pub struct Intercept<Service> {
    next: Service,
    dispatcher: Arc<Dispatcher>,
}

impl<Service> tower::Service<Request<Bytes>> for Intercept<Service>
where
    Service: tower::Service<Request<Bytes>, Response = Response<Body>> + Send + Clone + 'static,
    Service::Future: Send,
    Service::Error: Display + Send + 'static,
{
    type Response = Response<Body>;
    type Error = Service::Error;
    type Future = BoxFuture<'static, Result<Response<Body>, Self::Error>>;

    // A call may reach the network twice (translated call, then pass-through
    // fallback), so readiness is driven per call on clones of `next`.
    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let next = self.next.clone();
        let dispatcher = self.dispatcher.clone();

        Box::pin(async move { dispatcher.dispatch(next, request).await })
    }
}
