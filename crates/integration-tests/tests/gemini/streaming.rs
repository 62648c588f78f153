use integration_tests::{GeminiMock, TestBridge, event_names, reassemble};
use serde_json::json;

#[tokio::test]
async fn text_stream() {
    let server = GeminiMock::new().with_text("Streamed hello").spawn().await;
    let bridge = TestBridge::gemini(&server);

    let events = bridge
        .messages_stream(json!({
            "model": "gemini-2.0-flash",
            "stream": true,
            "messages": [{ "role": "user", "content": "Hello" }]
        }))
        .await;

    assert_eq!(
        event_names(&events),
        [
            "message_start",
            "content_block_start",
            "content_block_delta",
            "content_block_stop",
            "message_delta",
            "message_stop"
        ]
    );

    insta::assert_json_snapshot!(events, {
        "[0].message.id" => "[id]",
    }, @r#"
    [
      {
        "type": "message_start",
        "message": {
          "id": "[id]",
          "type": "message",
          "role": "assistant",
          "model": "gemini-2.0-flash",
          "content": [],
          "stop_reason": null,
          "stop_sequence": null,
          "usage": {
            "input_tokens": 10,
            "output_tokens": 0
          }
        }
      },
      {
        "type": "content_block_start",
        "index": 0,
        "content_block": {
          "type": "text",
          "text": ""
        }
      },
      {
        "type": "content_block_delta",
        "index": 0,
        "delta": {
          "type": "text_delta",
          "text": "Streamed hello"
        }
      },
      {
        "type": "content_block_stop",
        "index": 0
      },
      {
        "type": "message_delta",
        "delta": {
          "stop_reason": "end_turn",
          "stop_sequence": null
        },
        "usage": {
          "output_tokens": 15
        }
      },
      {
        "type": "message_stop"
      }
    ]
    "#);

    // The native call itself is never streamed.
    assert_eq!(server.native_requests()[0].path, "/v1beta/models/gemini-2.0-flash:generateContent");
}

#[tokio::test]
async fn stream_reassembles_to_the_non_streaming_reply() {
    let mock = GeminiMock::new()
        .with_text("Checking the weather.")
        .with_tool_call("get_weather", json!({ "city": "Lisbon", "units": "metric" }));

    let request = json!({
        "model": "gemini-2.0-flash",
        "messages": [{ "role": "user", "content": "Weather in Lisbon?" }],
        "tools": [{
            "name": "get_weather",
            "input_schema": {
                "type": "object",
                "properties": { "city": { "type": "string" }, "units": { "type": "string" } }
            }
        }]
    });

    let server = mock.clone().spawn().await;
    let bridge = TestBridge::gemini(&server);

    let (_, plain) = bridge.messages(request.clone()).await;

    let mut streaming = request;
    streaming["stream"] = json!(true);

    let events = bridge.messages_stream(streaming).await;

    assert_eq!(
        event_names(&events),
        [
            "message_start",
            "content_block_start",
            "content_block_delta",
            "content_block_stop",
            "content_block_start",
            "content_block_delta",
            "content_block_stop",
            "message_delta",
            "message_stop"
        ]
    );

    let mut reassembled = serde_json::to_value(reassemble(&events)).unwrap();
    let mut plain = plain;

    // Ids are generated per reply.
    for message in [&mut reassembled, &mut plain] {
        message["id"] = json!("[id]");
        message["content"][1]["id"] = json!("[tool_id]");
    }

    assert_eq!(reassembled, plain);
    assert_eq!(plain["stop_reason"], "tool_use");
    assert_eq!(plain["content"][1]["input"], json!({ "city": "Lisbon", "units": "metric" }));
}
