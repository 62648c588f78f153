use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::protocol::anthropic::{error::Error, messages::ResponseContent};

use super::{Response, StopReason};

/// Server-sent event of the Messages streaming API.
///
/// Each serialized value maps to a concrete SSE `event:` name. Streams begin
/// with [`StreamEvent::MessageStart`], emit one lifecycle per content block
/// (`content_block_start` → `content_block_delta*` → `content_block_stop`),
/// then a [`StreamEvent::MessageDelta`] and a terminal
/// [`StreamEvent::MessageStop`]. Unknown payloads are preserved through
/// [`StreamEvent::Unknown`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Announces the message with an empty `content` array.
    MessageStart { message: Box<Response> },
    /// Opens the content block at `index` with an empty placeholder.
    ContentBlockStart { index: u32, content_block: ResponseContent },
    /// Incremental update for the referenced block.
    ContentBlockDelta { index: u32, delta: ContentDelta },
    ContentBlockStop { index: u32 },
    /// Final stop reason and cumulative output usage.
    MessageDelta { delta: MessageDeltaBody, usage: DeltaUsage },
    MessageStop,
    Ping,
    Error { error: Error },
    #[serde(untagged)]
    Unknown(Value),
}

impl StreamEvent {
    /// SSE `event:` name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            StreamEvent::MessageStart { .. } => "message_start",
            StreamEvent::ContentBlockStart { .. } => "content_block_start",
            StreamEvent::ContentBlockDelta { .. } => "content_block_delta",
            StreamEvent::ContentBlockStop { .. } => "content_block_stop",
            StreamEvent::MessageDelta { .. } => "message_delta",
            StreamEvent::MessageStop => "message_stop",
            StreamEvent::Ping => "ping",
            StreamEvent::Error { .. } => "error",
            StreamEvent::Unknown(_) => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentDelta {
    TextDelta {
        text: String,
    },
    /// A fragment of the JSON-encoded tool input.
    InputJsonDelta {
        partial_json: String,
    },
    #[serde(untagged)]
    Unknown(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDeltaBody {
    pub stop_reason: Option<StopReason>,
    pub stop_sequence: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaUsage {
    pub output_tokens: u32,
}
