use indoc::indoc;
use integration_tests::{GeminiMock, TestBridge};
use serde_json::json;

const COMPATIBLE_CONFIG: &str = indoc! {r#"
    [provider]
    base_url = "{base_url}"
    api_key = "messages-key"

    [adapter]
    inject_mcp_metadata = true

    [error_cache]
    path = "{dir}/last-error.json"
"#};

#[tokio::test]
async fn compatible_provider_is_not_translated() {
    let server = GeminiMock::new().spawn().await;
    let bridge = TestBridge::new(COMPATIBLE_CONFIG, &server.base_url());

    let (status, body) = bridge
        .messages(json!({
            "model": "claude-sonnet-4",
            "max_tokens": 32,
            "messages": [{ "role": "user", "content": "Hello" }]
        }))
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["passthrough"], true);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/v1beta/models/v1/messages");
    assert_eq!(requests[0].header("x-api-key"), Some("messages-key"));
    assert_eq!(requests[0].header("x-goog-api-key"), None);
}

#[tokio::test]
async fn mcp_tools_get_metadata() {
    let server = GeminiMock::new().spawn().await;
    let bridge = TestBridge::new(COMPATIBLE_CONFIG, &server.base_url());

    bridge
        .messages(json!({
            "model": "claude-sonnet-4",
            "messages": [{ "role": "user", "content": "List files" }],
            "tools": [
                {
                    "name": "mcp__fs__list",
                    "input_schema": { "type": "object", "properties": { "dir": { "type": "string" } }, "required": ["dir"] }
                },
                { "name": "bash", "input_schema": { "type": "object", "properties": {} } }
            ]
        }))
        .await;

    let tools = &server.requests()[0].body["tools"];

    assert_eq!(
        tools[0]["input_schema"]["required"],
        json!(["dir", "_intent", "_displayName"])
    );
    assert_eq!(tools[0]["input_schema"]["properties"]["_intent"]["type"], "string");
    assert_eq!(tools[1], json!({ "name": "bash", "input_schema": { "type": "object", "properties": {} } }));
}

#[tokio::test]
async fn other_endpoints_are_left_alone() {
    let server = GeminiMock::new().spawn().await;
    let bridge = TestBridge::gemini(&server);

    let url = format!("{}/v1/messages/count_tokens", server.base_url());

    let request = axum::http::Request::builder()
        .method("POST")
        .uri(url)
        .body(axum::body::Bytes::from_static(b"{\"model\":\"gemini-2.0-flash\",\"messages\":[]}"))
        .unwrap();

    let response = bridge.client.send(request).await.unwrap();
    assert_eq!(response.status(), 200);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["passthrough"], true);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/v1beta/models/v1/messages/count_tokens");

    // Mirrored to the debug log like any other call.
    let log = std::fs::read_to_string(bridge.path("debug.log")).unwrap();
    assert!(log.contains("/v1/messages/count_tokens"), "{log}");
    assert!(log.contains("\"passthrough\":true"), "{log}");
}
