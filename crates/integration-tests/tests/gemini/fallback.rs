use integration_tests::{GeminiMock, TestBridge};
use serde_json::json;

#[tokio::test]
async fn unparseable_native_reply_forwards_original_request() {
    let server = GeminiMock::new()
        .with_raw_reply(200, "<html>captive portal</html>")
        .spawn()
        .await;

    let bridge = TestBridge::gemini(&server);

    let request = json!({
        "model": "gemini-2.0-flash",
        "messages": [{ "role": "user", "content": "Hello" }]
    });

    let (status, body) = bridge.messages(request.clone()).await;

    assert_eq!(status, 200);
    assert_eq!(body, json!({ "passthrough": true, "path": "/v1beta/models/v1/messages" }));

    let requests = server.requests();
    assert_eq!(requests.len(), 2);

    assert_eq!(requests[0].path, "/v1beta/models/gemini-2.0-flash:generateContent");

    // The forwarded call is the caller's request, untouched.
    assert_eq!(requests[1].path, "/v1beta/models/v1/messages");
    assert_eq!(requests[1].body, request);
    assert_eq!(requests[1].header("x-api-key"), Some("test-gemini-key"));
    assert_eq!(requests[1].header("anthropic-version"), Some("2023-06-01"));
}

#[tokio::test]
async fn malformed_request_is_forwarded() {
    let server = GeminiMock::new().with_text("unused").spawn().await;
    let bridge = TestBridge::gemini(&server);

    let (status, body) = bridge.messages(json!({ "messages": 42 })).await;

    assert_eq!(status, 200);
    assert_eq!(body["passthrough"], true);

    assert!(server.native_requests().is_empty());
    assert_eq!(server.requests()[0].body, json!({ "messages": 42 }));
}
