use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Content blocks of an assembled message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseContent {
    Text(ResponseTextBlock),
    ToolUse(ResponseToolUseBlock),

    #[serde(untagged)]
    Unknown(Value),
}

impl ResponseContent {
    pub fn is_tool_use(&self) -> bool {
        matches!(self, ResponseContent::ToolUse(_))
    }
}

/// Text produced by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseTextBlock {
    pub text: String,
}

/// Tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseToolUseBlock {
    /// Identifier the caller echoes back in the tool result.
    pub id: String,
    /// Name of the tool being invoked.
    pub name: String,
    /// Arguments as a JSON object.
    pub input: Value,
}
