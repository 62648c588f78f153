use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::protocol::unknown_fields::UnknownFields;

/// A single conversation turn of a Messages request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputMessage {
    /// Originating role for the message turn.
    pub role: Role,
    /// Message body provided as text or structured blocks.
    pub content: InputMessageContent,

    /// Extra message fields passed through untouched.
    #[serde(flatten)]
    pub unknown_fields: UnknownFields,
}

/// Message roles. Anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    #[serde(untagged)]
    Unknown(String),
}

/// Message content may be provided as a raw string or as structured content blocks.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum InputMessageContent {
    Text(String),
    Items(Vec<InputMessageStructuredContent>),
}

/// Structured content blocks understood by the bridge.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputMessageStructuredContent {
    Text(RequestTextBlock),
    Image(RequestImageBlock),
    ToolUse(RequestToolUseBlock),
    ToolResult(RequestToolResultBlock),
    #[serde(untagged)]
    Unknown(Value),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RequestTextBlock {
    pub text: String,

    #[serde(flatten)]
    pub unknown_fields: UnknownFields,
}

/// Image content block.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RequestImageBlock {
    /// Where the image bytes come from.
    pub source: ImageSource,

    #[serde(flatten)]
    pub unknown_fields: UnknownFields,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageSource {
    /// Inline image bytes.
    Base64 { media_type: String, data: String },
    Url { url: String },
    #[serde(untagged)]
    Unknown(Value),
}

/// Tool call previously emitted by the assistant.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RequestToolUseBlock {
    /// Identifier later referenced by the matching tool result.
    pub id: String,

    /// Name of the tool being invoked.
    pub name: String,

    /// Arguments of the call.
    #[serde(default)]
    pub input: Value,

    #[serde(flatten)]
    pub unknown_fields: UnknownFields,
}

/// Outcome of a tool invocation, sent back by the caller.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RequestToolResultBlock {
    /// Identifier of the tool use this result corresponds to.
    pub tool_use_id: String,

    /// Optional content returned by the tool (string or block array).
    #[serde(default)]
    pub content: Option<Value>,

    /// Indicates whether the tool invocation failed.
    #[serde(default)]
    pub is_error: Option<bool>,

    #[serde(flatten)]
    pub unknown_fields: UnknownFields,
}
