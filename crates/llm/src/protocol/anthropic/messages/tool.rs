use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::protocol::unknown_fields::UnknownFields;

/// Tool definition of a Messages request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Tool {
    /// Tool name surfaced to the model and in tool_use blocks. Tools without a
    /// name are ignored during translation.
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Tool category (`custom` when omitted).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// JSON Schema describing the tool's expected input payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,

    #[serde(flatten)]
    pub unknown_fields: UnknownFields,
}

/// Controls how the model may interact with tools.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolChoice {
    Auto {
        #[serde(flatten)]
        unknown_fields: UnknownFields,
    },
    Any {
        #[serde(flatten)]
        unknown_fields: UnknownFields,
    },
    Tool {
        /// Name of the required tool.
        name: String,
        #[serde(flatten)]
        unknown_fields: UnknownFields,
    },
    None {
        #[serde(flatten)]
        unknown_fields: UnknownFields,
    },
    #[serde(untagged)]
    Unknown(Value),
}
