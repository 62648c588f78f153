use std::{
    task::{Context, Poll},
    time::Duration,
};

use axum::body::{Body, Bytes};
use futures::future::BoxFuture;
use http::{HeaderMap, HeaderValue, Request, Response, header::CONNECTION};
use reqwest::Client;

/// Client builder shared by every bridge client.
///
/// No request timeout is set: generation calls can legitimately run for
/// minutes and callers bound them with their own deadline.
pub fn default_http_client_builder() -> reqwest::ClientBuilder {
    let mut headers = HeaderMap::new();
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

    Client::builder()
        // Hyper only exposes max idle connections per host and the idle timeout.
        // Connections have no TTL, so a short idle timeout is what lets DNS
        // changes be picked up.
        .pool_idle_timeout(Some(Duration::from_secs(5)))
        .tcp_nodelay(true)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .default_headers(headers)
}

/// The network as a tower service, at the bottom of the client stack.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl tower::Service<Request<Bytes>> for HttpTransport {
    type Response = Response<Body>;
    type Error = reqwest::Error;
    type Future = BoxFuture<'static, Result<Response<Body>, reqwest::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let client = self.client.clone();

        Box::pin(async move {
            let request = reqwest::Request::try_from(request.map(reqwest::Body::from))?;
            let response = client.execute(request).await?;

            Ok(http::Response::from(response).map(Body::new))
        })
    }
}
