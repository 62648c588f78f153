//! A stand-in for the Gemini API, recording every request it receives.

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// A request as seen by the mock server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Value,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Json(StatusCode, Value),
    Raw(StatusCode, String),
}

/// Builder for the native reply served on `:generateContent`.
///
/// Every other path answers `{"passthrough": true, "path": ...}` so tests can
/// tell a forwarded Messages call from a translated one.
#[derive(Debug, Clone)]
pub struct GeminiMock {
    parts: Vec<Value>,
    finish_reason: &'static str,
    usage: Value,
    reply: Option<Reply>,
}

impl Default for GeminiMock {
    fn default() -> Self {
        Self::new()
    }
}

impl GeminiMock {
    pub fn new() -> Self {
        Self {
            parts: Vec::new(),
            finish_reason: "STOP",
            usage: json!({ "promptTokenCount": 10, "candidatesTokenCount": 15, "totalTokenCount": 25 }),
            reply: None,
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.parts.push(json!({ "text": text }));
        self
    }

    pub fn with_thought(mut self, text: &str) -> Self {
        self.parts.push(json!({ "text": text, "thought": true }));
        self
    }

    pub fn with_tool_call(mut self, name: &str, args: Value) -> Self {
        self.parts.push(json!({ "functionCall": { "name": name, "args": args } }));
        self
    }

    pub fn with_finish_reason(mut self, reason: &'static str) -> Self {
        self.finish_reason = reason;
        self
    }

    pub fn with_usage(mut self, usage: Value) -> Self {
        self.usage = usage;
        self
    }

    /// Replies with a Google-style error envelope.
    pub fn with_error(mut self, status: u16, message: &str) -> Self {
        let status = StatusCode::from_u16(status).unwrap();

        let body = json!({
            "error": {
                "code": status.as_u16(),
                "message": message,
                "status": status.canonical_reason().unwrap_or_default().to_uppercase().replace(' ', "_"),
            }
        });

        self.reply = Some(Reply::Json(status, body));
        self
    }

    /// Replies with an arbitrary body, e.g. something that is not JSON.
    pub fn with_raw_reply(mut self, status: u16, body: &str) -> Self {
        self.reply = Some(Reply::Raw(StatusCode::from_u16(status).unwrap(), body.to_string()));
        self
    }

    fn native_reply(&self) -> Reply {
        if let Some(reply) = &self.reply {
            return reply.clone();
        }

        let body = json!({
            "candidates": [{
                "content": { "role": "model", "parts": self.parts },
                "finishReason": self.finish_reason,
            }],
            "usageMetadata": self.usage,
            "modelVersion": "gemini-mock-001",
        });

        Reply::Json(StatusCode::OK, body)
    }

    pub async fn spawn(self) -> GeminiServer {
        let state = Arc::new(MockState {
            mock: self,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        GeminiServer { address, state }
    }
}

struct MockState {
    mock: GeminiMock,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Handle to a running [`GeminiMock`].
pub struct GeminiServer {
    address: SocketAddr,
    state: Arc<MockState>,
}

impl GeminiServer {
    /// Base URL in the shape users configure for Gemini.
    pub fn base_url(&self) -> String {
        format!("http://{}/v1beta/models", self.address)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn native_requests(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.path.ends_with(":generateContent"))
            .collect()
    }
}

async fn handle(State(state): State<Arc<MockState>>, method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    let path = uri.path().to_string();
    let parsed = serde_json::from_slice(&body).unwrap_or(Value::Null);

    state.requests.lock().unwrap().push(RecordedRequest {
        method,
        path: path.clone(),
        headers,
        body: parsed,
    });

    if !path.ends_with(":generateContent") {
        let body = json!({ "passthrough": true, "path": path });
        return (StatusCode::OK, axum::Json(body)).into_response();
    }

    match state.mock.native_reply() {
        Reply::Json(status, body) => (status, axum::Json(body)).into_response(),
        Reply::Raw(status, body) => (status, body).into_response(),
    }
}
