use integration_tests::{GeminiMock, TestBridge};
use serde_json::json;

#[tokio::test]
async fn tool_call_reply() {
    let server = GeminiMock::new()
        .with_tool_call("get_weather", json!({ "location": "San Francisco", "unit": "celsius" }))
        .spawn()
        .await;

    let bridge = TestBridge::gemini(&server);

    let (status, body) = bridge
        .messages(json!({
            "model": "gemini-2.0-flash",
            "messages": [{ "role": "user", "content": "What's the weather in San Francisco?" }],
            "tools": [{
                "name": "get_weather",
                "description": "Get the current weather in a given location",
                "input_schema": {
                    "$schema": "http://json-schema.org/draft-07/schema#",
                    "type": "object",
                    "properties": {
                        "location": { "type": "string", "description": "The city and state" },
                        "unit": { "type": "string", "enum": ["celsius", "fahrenheit"] }
                    },
                    "required": ["location"],
                    "additionalProperties": false
                }
            }],
            "tool_choice": { "type": "auto" }
        }))
        .await;

    assert_eq!(status, 200);

    insta::assert_json_snapshot!(body, {
        ".id" => "[id]",
        ".content[0].id" => "[tool_id]",
    }, @r#"
    {
      "id": "[id]",
      "type": "message",
      "role": "assistant",
      "model": "gemini-2.0-flash",
      "content": [
        {
          "type": "tool_use",
          "id": "[tool_id]",
          "name": "get_weather",
          "input": {
            "location": "San Francisco",
            "unit": "celsius"
          }
        }
      ],
      "stop_reason": "tool_use",
      "stop_sequence": null,
      "usage": {
        "input_tokens": 10,
        "output_tokens": 15
      }
    }
    "#);

    let native = &server.native_requests()[0].body;

    insta::assert_json_snapshot!(native["tools"], @r#"
    [
      {
        "functionDeclarations": [
          {
            "name": "get_weather",
            "description": "Get the current weather in a given location",
            "parameters": {
              "type": "OBJECT",
              "properties": {
                "location": {
                  "type": "STRING",
                  "description": "The city and state"
                },
                "unit": {
                  "type": "STRING",
                  "enum": [
                    "celsius",
                    "fahrenheit"
                  ]
                }
              },
              "required": [
                "location"
              ]
            }
          }
        ]
      }
    ]
    "#);

    assert_eq!(native["toolConfig"], json!({ "functionCallingConfig": { "mode": "AUTO" } }));
}

#[tokio::test]
async fn tool_results_are_correlated_by_id() {
    let server = GeminiMock::new().with_text("It is sunny in Paris.").spawn().await;
    let bridge = TestBridge::gemini(&server);

    let (status, _) = bridge
        .messages(json!({
            "model": "gemini-2.0-flash",
            "messages": [
                { "role": "user", "content": "Weather in Paris and Rome?" },
                {
                    "role": "assistant",
                    "content": [
                        { "type": "tool_use", "id": "toolu_paris", "name": "get_weather", "input": { "city": "Paris" } },
                        { "type": "tool_use", "id": "toolu_time", "name": "get_time", "input": {} }
                    ]
                },
                {
                    "role": "user",
                    "content": [
                        { "type": "tool_result", "tool_use_id": "toolu_time", "content": "12:00" },
                        { "type": "tool_result", "tool_use_id": "toolu_paris", "content": [{ "type": "text", "text": "Sunny" }] },
                        { "type": "tool_result", "tool_use_id": "toolu_unknown", "content": "dropped" }
                    ]
                }
            ]
        }))
        .await;

    assert_eq!(status, 200);

    let native = &server.native_requests()[0].body;

    insta::assert_json_snapshot!(native["contents"][2], @r#"
    {
      "role": "user",
      "parts": [
        {
          "functionResponse": {
            "name": "get_time",
            "response": {
              "content": "12:00"
            }
          }
        },
        {
          "functionResponse": {
            "name": "get_weather",
            "response": {
              "content": [
                {
                  "type": "text",
                  "text": "Sunny"
                }
              ]
            }
          }
        }
      ]
    }
    "#);
}
