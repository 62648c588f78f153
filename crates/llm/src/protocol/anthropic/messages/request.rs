use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::protocol::{lenient, unknown_fields::UnknownFields};

use super::*;

/// Request body for the Messages API.
///
/// Sampling parameters are optional and tolerate non-numeric values, which are
/// treated as absent rather than rejecting the whole body.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Request {
    /// The model that will complete the prompt.
    pub model: String,
    /// Conversation turns.
    pub messages: Vec<InputMessage>,

    /// Maximum number of output tokens.
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<f64>,

    /// System prompt providing global instructions for the assistant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemPrompt>,

    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,

    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub top_k: Option<f64>,

    /// Custom strings that cause generation to stop when produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,

    /// When true, deliver a Server-Sent Events stream instead of a single body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,

    /// Tool specifications the model may call during this request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,

    /// Directive controlling if and how the model must use tools.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,

    /// Additional fields preserved for forward compatibility.
    #[serde(flatten)]
    pub unknown_fields: UnknownFields,
}

impl Request {
    pub fn from_slice(body: &[u8]) -> Result<Self, crate::TranslationError> {
        sonic_rs::from_slice(body).map_err(crate::TranslationError::InvalidRequest)
    }

    pub fn is_streaming(&self) -> bool {
        self.stream.unwrap_or(false)
    }
}

/// System prompt payload.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SystemPrompt {
    /// Plain-text system prompt.
    Text(String),
    /// Structured system prompt comprised of content blocks.
    Blocks(Vec<SystemInputMessage>),
}

impl SystemPrompt {
    /// Text of the prompt, blocks joined by newlines and trimmed. `None` when
    /// nothing but whitespace remains.
    pub fn text(&self) -> Option<String> {
        let joined = match self {
            SystemPrompt::Text(text) => text.clone(),
            SystemPrompt::Blocks(blocks) => blocks
                .iter()
                .filter_map(|block| match block {
                    SystemInputMessage::Text(block) => Some(block.text.as_str()),
                    SystemInputMessage::Unknown(_) => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        };

        let trimmed = joined.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SystemInputMessage {
    Text(RequestTextBlock),
    #[serde(untagged)]
    Unknown(Value),
}
