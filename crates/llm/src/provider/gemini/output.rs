use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    TranslationError,
    protocol::{
        anthropic::messages::{
            MessageKind, Response, ResponseContent, ResponseTextBlock, ResponseToolUseBlock, Role, StopReason, Usage,
        },
        gemini::{FinishReason, GenerateContentResponse, Part},
    },
    stream::{self, SseFrame},
};

/// A native reply converted to the Messages protocol.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembled {
    pub message: Response,
    /// Synthesized event stream, present when the caller asked for streaming.
    pub frames: Option<Vec<SseFrame>>,
}

pub fn assemble(
    native: &GenerateContentResponse,
    requested_model: &str,
    stream_requested: bool,
) -> Result<Assembled, TranslationError> {
    let message = assemble_message(native, requested_model);

    let frames = if stream_requested {
        Some(stream::synthesize(&message)?)
    } else {
        None
    };

    Ok(Assembled { message, frames })
}

/// Converts the first candidate of a native reply into an assistant message.
///
/// Tool-use ids are generated here since Gemini has no notion of them; they
/// are only meaningful within this one message.
pub fn assemble_message(native: &GenerateContentResponse, requested_model: &str) -> Response {
    let candidate = native.candidates.first();

    let parts = candidate
        .and_then(|candidate| candidate.content.as_ref())
        .map(|content| content.parts.as_slice())
        .unwrap_or_default();

    let usage = native
        .usage_metadata
        .map(|usage| Usage {
            input_tokens: usage.prompt_token_count,
            output_tokens: usage.candidates_token_count.saturating_add(usage.thoughts_token_count),
        })
        .unwrap_or_default();

    let mut message = Response {
        id: format!("msg_{}", Uuid::new_v4().simple()),
        kind: MessageKind::Message,
        role: Role::Assistant,
        model: requested_model.to_string(),
        content: content_blocks(parts),
        stop_reason: None,
        stop_sequence: None,
        usage,
    };

    let stop_reason = if message.has_tool_use() {
        StopReason::ToolUse
    } else {
        match candidate.and_then(|candidate| candidate.finish_reason.as_ref()) {
            Some(FinishReason::MaxTokens) => StopReason::MaxTokens,
            Some(reason) if reason.is_content_filter() => StopReason::StopSequence,
            None if candidate.is_none() && prompt_blocked(native) => StopReason::StopSequence,
            _ => StopReason::EndTurn,
        }
    };

    message.stop_reason = Some(stop_reason);
    message
}

fn content_blocks(parts: &[Part]) -> Vec<ResponseContent> {
    let mut content = Vec::new();

    for part in parts {
        if part.is_thought() {
            continue;
        }

        if let Some(text) = part.text.as_deref().filter(|text| !text.is_empty()) {
            match content.last_mut() {
                Some(ResponseContent::Text(block)) => block.text.push_str(text),
                _ => content.push(ResponseContent::Text(ResponseTextBlock { text: text.to_string() })),
            }
        }

        if let Some(call) = &part.function_call {
            let input = match &call.args {
                Some(Value::Null) | None => Value::Object(Map::new()),
                Some(args) => args.clone(),
            };

            content.push(ResponseContent::ToolUse(ResponseToolUseBlock {
                id: format!("toolu_{}", Uuid::new_v4().simple()),
                name: call.name.clone(),
                input,
            }));
        }
    }

    content
}

fn prompt_blocked(native: &GenerateContentResponse) -> bool {
    native
        .prompt_feedback
        .as_ref()
        .is_some_and(|feedback| feedback.block_reason.is_some())
}
