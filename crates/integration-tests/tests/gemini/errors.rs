use integration_tests::{GeminiMock, TestBridge};
use serde_json::json;

fn hello() -> serde_json::Value {
    json!({
        "model": "gemini-2.0-flash",
        "messages": [{ "role": "user", "content": "Hello" }]
    })
}

#[tokio::test]
async fn upstream_error_becomes_messages_error() {
    let server = GeminiMock::new()
        .with_error(429, "Quota exceeded for quota metric 'Generate Content API requests per minute'")
        .spawn()
        .await;

    let bridge = TestBridge::gemini(&server);

    let (status, body) = bridge.messages(hello()).await;

    assert_eq!(status, 429);

    insta::assert_json_snapshot!(body, @r#"
    {
      "type": "error",
      "error": {
        "type": "rate_limit_error",
        "message": "Quota exceeded for quota metric 'Generate Content API requests per minute'"
      }
    }
    "#);

    let stored = bridge.client.error_cache().peek_and_clear().unwrap();

    assert_eq!(stored.status, 429);
    assert_eq!(stored.status_text, "Too Many Requests");
    assert_eq!(
        stored.message,
        "Quota exceeded for quota metric 'Generate Content API requests per minute'"
    );

    // Popped once.
    assert_eq!(bridge.client.error_cache().peek_and_clear(), None);

    // A native error reply is final: no pass-through retry.
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn error_types_follow_status() {
    let cases = [
        (400, "invalid_request_error"),
        (401, "authentication_error"),
        (403, "permission_error"),
        (404, "not_found_error"),
        (500, "api_error"),
        (503, "api_error"),
    ];

    for (status, kind) in cases {
        let server = GeminiMock::new().with_error(status, "upstream said no").spawn().await;
        let bridge = TestBridge::gemini(&server);

        let (actual, body) = bridge.messages(hello()).await;

        assert_eq!(actual, status);
        assert_eq!(body["error"]["type"], kind, "status {status}");
        assert_eq!(body["error"]["message"], "upstream said no");
    }
}

#[tokio::test]
async fn non_json_error_uses_raw_text() {
    let server = GeminiMock::new()
        .with_raw_reply(502, "upstream connect error")
        .spawn()
        .await;

    let bridge = TestBridge::gemini(&server);

    let (status, body) = bridge.messages(hello()).await;

    assert_eq!(status, 502);
    assert_eq!(body["error"]["message"], "upstream connect error");

    let stored = bridge.client.error_cache().peek_and_clear().unwrap();
    assert_eq!(stored.status_text, "Bad Gateway");
}

#[tokio::test]
async fn missing_api_key() {
    let server = GeminiMock::new().with_text("unreachable").spawn().await;

    let config = r#"
        [provider]
        base_url = "{base_url}"
        kind = "gemini"

        [error_cache]
        path = "{dir}/last-error.json"
    "#;

    let bridge = TestBridge::new(config, &server.base_url());

    let (status, body) = bridge.messages(hello()).await;

    assert_eq!(status, 401);

    insta::assert_json_snapshot!(body, @r#"
    {
      "type": "error",
      "error": {
        "type": "authentication_error",
        "message": "Missing API key for Gemini provider"
      }
    }
    "#);

    assert!(server.requests().is_empty());
}
