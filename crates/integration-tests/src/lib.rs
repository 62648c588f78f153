pub mod gemini;

use std::path::PathBuf;

use config::Config;
use futures::StreamExt as _;
use interceptor::AdapterClient;
use llm::{
    protocol::anthropic::messages::{Response, StreamEvent},
    stream::{StreamAccumulator, parse_event},
};
use serde_json::Value;
use tempfile::TempDir;

pub use gemini::{GeminiMock, GeminiServer, RecordedRequest};

/// An [`AdapterClient`] wired to a mock upstream, with its error cache and
/// debug log in a private temporary directory.
pub struct TestBridge {
    pub client: AdapterClient,
    pub config: Config,
    dir: TempDir,
}

impl TestBridge {
    /// Builds a client from `config`, a TOML document that may refer to
    /// `{base_url}` and `{dir}`.
    pub fn new(config: &str, base_url: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();

        let config = config
            .replace("{base_url}", base_url)
            .replace("{dir}", &dir.path().display().to_string());

        let config: Config = toml::from_str(&config).unwrap();
        let client = AdapterClient::new(&config).unwrap();

        Self { client, config, dir }
    }

    /// Client talking to `server` as a Gemini provider.
    pub fn gemini(server: &GeminiServer) -> Self {
        Self::new(GEMINI_CONFIG, &server.base_url())
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Sends a Messages request and returns the status and JSON body.
    pub async fn messages(&self, request: Value) -> (u16, Value) {
        let response = self.client.post_messages(request.to_string()).await.unwrap();
        let status = response.status().as_u16();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();

        (status, serde_json::from_slice(&body).unwrap())
    }

    /// Sends a streaming Messages request and returns the parsed events.
    pub async fn messages_stream(&self, request: Value) -> Vec<StreamEvent> {
        use eventsource_stream::Eventsource as _;

        let response = self.client.post_messages(request.to_string()).await.unwrap();

        assert_eq!(
            response.headers().get("content-type").and_then(|value| value.to_str().ok()),
            Some("text/event-stream")
        );

        let mut stream = response.into_body().into_data_stream().eventsource();
        let mut events = Vec::new();

        while let Some(event) = stream.next().await {
            let event = event.unwrap();
            events.push(parse_event(&event.event, &event.data).unwrap());
        }

        events
    }
}

pub const GEMINI_CONFIG: &str = r#"
[provider]
base_url = "{base_url}"
api_key = "test-gemini-key"
kind = "gemini"

[adapter]
debug_log = "{dir}/debug.log"

[error_cache]
path = "{dir}/last-error.json"
"#;

/// Folds a parsed event stream into the message it describes.
pub fn reassemble(events: &[StreamEvent]) -> Response {
    let mut accumulator = StreamAccumulator::new();

    for event in events {
        accumulator.push(event.clone()).unwrap();
    }

    accumulator.finish().unwrap()
}

/// Event names in order, for asserting on the frame sequence.
pub fn event_names(events: &[StreamEvent]) -> Vec<&'static str> {
    events.iter().map(StreamEvent::name).collect()
}
