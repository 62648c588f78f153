use serde::{Deserialize, Serialize};

use super::{ResponseContent, Role};

/// Complete, non-streamed reply of the Messages API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Unique object identifier, `msg_` prefixed.
    pub id: String,

    /// Object type. Always `message`.
    #[serde(rename = "type")]
    pub kind: MessageKind,

    /// Conversational role of the generated message. Always `assistant`.
    pub role: Role,

    /// Model that handled the request, as the caller named it.
    pub model: String,

    /// Content generated by the model, in order.
    pub content: Vec<ResponseContent>,

    /// Why generation stopped. `null` in the `message_start` stream event.
    pub stop_reason: Option<StopReason>,

    /// The custom stop sequence that was generated, if any.
    pub stop_sequence: Option<String>,

    /// Billing and rate-limit usage.
    pub usage: Usage,
}

impl Response {
    pub fn has_tool_use(&self) -> bool {
        self.content.iter().any(ResponseContent::is_tool_use)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[default]
    Message,
}

/// Stop reasons reported on assembled messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model reached a natural stopping point.
    EndTurn,
    /// Generation hit `max_tokens`.
    MaxTokens,
    /// Generation stopped on a stop sequence or a provider content filter.
    StopSequence,
    /// The model invoked one or more tools.
    ToolUse,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// The number of input tokens which were used.
    pub input_tokens: u32,
    /// The number of output tokens which were used.
    pub output_tokens: u32,
}
