use integration_tests::{GeminiMock, TestBridge};
use serde_json::json;

#[tokio::test]
async fn text_reply() {
    let server = GeminiMock::new().with_text("Hello! How can I help?").spawn().await;
    let bridge = TestBridge::gemini(&server);

    let (status, body) = bridge
        .messages(json!({
            "model": "gemini-2.0-flash",
            "max_tokens": 256,
            "messages": [{ "role": "user", "content": "Hello" }]
        }))
        .await;

    assert_eq!(status, 200);

    insta::assert_json_snapshot!(body, { ".id" => "[id]" }, @r#"
    {
      "id": "[id]",
      "type": "message",
      "role": "assistant",
      "model": "gemini-2.0-flash",
      "content": [
        {
          "type": "text",
          "text": "Hello! How can I help?"
        }
      ],
      "stop_reason": "end_turn",
      "stop_sequence": null,
      "usage": {
        "input_tokens": 10,
        "output_tokens": 15
      }
    }
    "#);

    assert!(body["id"].as_str().unwrap().starts_with("msg_"));
}

#[tokio::test]
async fn native_request_shape() {
    let server = GeminiMock::new().with_text("ok").spawn().await;
    let bridge = TestBridge::gemini(&server);

    bridge
        .messages(json!({
            "model": "models/gemini-2.5-pro",
            "system": "Answer briefly.",
            "max_tokens": 100,
            "temperature": 0.2,
            "stop_sequences": ["STOP"],
            "messages": [
                { "role": "user", "content": "Hi" },
                { "role": "assistant", "content": "Hello" },
                { "role": "user", "content": [{ "type": "text", "text": "Tell me a joke" }] }
            ]
        }))
        .await;

    let requests = server.native_requests();
    assert_eq!(requests.len(), 1);

    let request = &requests[0];

    assert_eq!(request.path, "/v1beta/models/gemini-2.5-pro:generateContent");
    assert_eq!(request.header("x-goog-api-key"), Some("test-gemini-key"));
    assert_eq!(request.header("x-api-key"), None);
    assert_eq!(request.header("anthropic-version"), None);

    insta::assert_json_snapshot!(request.body, @r#"
    {
      "contents": [
        {
          "role": "user",
          "parts": [
            {
              "text": "Hi"
            }
          ]
        },
        {
          "role": "model",
          "parts": [
            {
              "text": "Hello"
            }
          ]
        },
        {
          "role": "user",
          "parts": [
            {
              "text": "Tell me a joke"
            }
          ]
        }
      ],
      "systemInstruction": {
        "parts": [
          {
            "text": "Answer briefly."
          }
        ]
      },
      "generationConfig": {
        "maxOutputTokens": 100,
        "temperature": 0.2,
        "stopSequences": [
          "STOP"
        ]
      }
    }
    "#);
}

#[tokio::test]
async fn thoughts_are_hidden_but_counted() {
    let server = GeminiMock::new()
        .with_thought("Let me think about this.")
        .with_text("42")
        .with_finish_reason("MAX_TOKENS")
        .with_usage(json!({ "promptTokenCount": 7, "candidatesTokenCount": 1, "thoughtsTokenCount": 30 }))
        .spawn()
        .await;

    let bridge = TestBridge::gemini(&server);

    let (_, body) = bridge
        .messages(json!({
            "model": "gemini-2.5-flash",
            "messages": [{ "role": "user", "content": "What is the answer?" }]
        }))
        .await;

    assert_eq!(body["content"], json!([{ "type": "text", "text": "42" }]));
    assert_eq!(body["stop_reason"], "max_tokens");
    assert_eq!(body["usage"], json!({ "input_tokens": 7, "output_tokens": 31 }));
}

#[tokio::test]
async fn safety_block_maps_to_stop_sequence() {
    let server = GeminiMock::new().with_finish_reason("SAFETY").spawn().await;
    let bridge = TestBridge::gemini(&server);

    let (status, body) = bridge
        .messages(json!({
            "model": "gemini-2.0-flash",
            "messages": [{ "role": "user", "content": "Something dubious" }]
        }))
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["content"], json!([]));
    assert_eq!(body["stop_reason"], "stop_sequence");
}

#[tokio::test]
async fn traffic_is_mirrored_to_debug_log() {
    let server = GeminiMock::new().with_text("logged").spawn().await;
    let bridge = TestBridge::gemini(&server);

    bridge
        .messages(json!({
            "model": "gemini-2.0-flash",
            "messages": [{ "role": "user", "content": "log me" }]
        }))
        .await;

    let log = std::fs::read_to_string(bridge.path("debug.log")).unwrap();

    assert!(log.contains(" REQUEST POST http://"), "{log}");
    assert!(log.contains("log me"), "{log}");
    assert!(log.contains(" RESPONSE 200 OK http://"), "{log}");
    assert!(log.contains("logged"), "{log}");
    assert!(!log.contains("test-gemini-key"), "{log}");
}
