use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::protocol::{
    anthropic::messages::{
        ImageSource, InputMessage, InputMessageContent, InputMessageStructuredContent, RequestToolResultBlock,
        RequestToolUseBlock, Role,
    },
    gemini::{Blob, Content, ContentRole, FunctionCall, FunctionResponse, Part},
};

/// Tool-call id to tool name, collected from the tool-use blocks of one
/// request. Gemini function responses are keyed by name, so every tool result
/// needs the name of the call it answers.
///
/// Never shared between requests: ids are only unique within a conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCallCorrelation(HashMap<String, String>);

impl ToolCallCorrelation {
    pub fn name_of(&self, tool_use_id: &str) -> Option<&str> {
        self.0.get(tool_use_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn record(&mut self, tool_use_id: &str, name: &str) {
        self.0.insert(tool_use_id.to_string(), name.to_string());
    }
}

/// Converts the conversation into Gemini contents.
///
/// Turns are processed in order, so a tool result can only resolve calls that
/// appeared before it. Results for unknown ids are dropped, as are turns left
/// without any part.
pub fn build_contents(turns: &[InputMessage]) -> (Vec<Content>, ToolCallCorrelation) {
    let mut correlation = ToolCallCorrelation::default();
    let mut contents = Vec::with_capacity(turns.len());

    for turn in turns {
        let parts: Vec<Part> = match &turn.content {
            InputMessageContent::Text(text) => text_part(text).into_iter().collect(),
            InputMessageContent::Items(blocks) => blocks
                .iter()
                .filter_map(|block| block_part(block, &mut correlation))
                .collect(),
        };

        if parts.is_empty() {
            continue;
        }

        contents.push(Content {
            role: Some(content_role(&turn.role)),
            parts,
        });
    }

    (contents, correlation)
}

fn content_role(role: &Role) -> ContentRole {
    match role {
        Role::Assistant => ContentRole::Model,
        Role::User | Role::Unknown(_) => ContentRole::User,
    }
}

fn block_part(block: &InputMessageStructuredContent, correlation: &mut ToolCallCorrelation) -> Option<Part> {
    match block {
        InputMessageStructuredContent::Text(block) => text_part(&block.text),
        InputMessageStructuredContent::Image(block) => match &block.source {
            ImageSource::Base64 { media_type, data } => Some(Part {
                inline_data: Some(Blob {
                    mime_type: media_type.clone(),
                    data: data.clone(),
                }),
                ..Default::default()
            }),
            _ => {
                log::debug!("Skipping image block without inline base64 data");
                None
            }
        },
        InputMessageStructuredContent::ToolUse(block) => Some(function_call_part(block, correlation)),
        InputMessageStructuredContent::ToolResult(block) => function_response_part(block, correlation),
        InputMessageStructuredContent::Unknown(_) => None,
    }
}

fn text_part(text: &str) -> Option<Part> {
    (!text.trim().is_empty()).then(|| Part::text(text))
}

fn function_call_part(block: &RequestToolUseBlock, correlation: &mut ToolCallCorrelation) -> Part {
    correlation.record(&block.id, &block.name);

    let args = match &block.input {
        Value::Null => Value::Object(Map::new()),
        input => input.clone(),
    };

    Part {
        function_call: Some(FunctionCall {
            name: block.name.clone(),
            args: Some(args),
        }),
        ..Default::default()
    }
}

fn function_response_part(block: &RequestToolResultBlock, correlation: &ToolCallCorrelation) -> Option<Part> {
    let Some(name) = correlation.name_of(&block.tool_use_id) else {
        log::debug!("Dropping tool result for unknown tool_use_id {}", block.tool_use_id);
        return None;
    };

    let mut response = Map::new();
    response.insert("content".to_string(), block.content.clone().unwrap_or(Value::Null));

    if block.is_error == Some(true) {
        response.insert("is_error".to_string(), Value::Bool(true));
    }

    Some(Part {
        function_response: Some(FunctionResponse {
            name: name.to_string(),
            response: Value::Object(response),
        }),
        ..Default::default()
    })
}
