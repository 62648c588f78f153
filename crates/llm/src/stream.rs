//! Server-sent event streams for assembled messages.
//!
//! The upstream call is never streamed, so a streaming caller receives a
//! stream fabricated from the complete message: one `message_start`, one
//! start/delta/stop triple per content block, one `message_delta` and a final
//! `message_stop`. Consumers drive a state machine off this order.
//!
//! [`StreamAccumulator`] performs the inverse and folds a stream back into a
//! message.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::{
    TranslationError,
    protocol::anthropic::messages::{
        ContentDelta, DeltaUsage, MessageDeltaBody, Response, ResponseContent, ResponseTextBlock,
        ResponseToolUseBlock, StreamEvent, Usage,
    },
};

/// One `event:`/`data:` pair of a Server-Sent-Events stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
}

impl SseFrame {
    pub fn new(event: &StreamEvent) -> Result<Self, TranslationError> {
        Ok(Self {
            event: event.name().to_string(),
            data: sonic_rs::to_string(event).map_err(TranslationError::Serialization)?,
        })
    }

    /// Decodes the payload, checking it against the event name.
    pub fn parse(&self) -> Result<StreamEvent, ReassembleError> {
        parse_event(&self.event, &self.data)
    }
}

impl fmt::Display for SseFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event: {}\ndata: {}\n\n", self.event, self.data)
    }
}

/// Decodes one received event. Events whose payload type disagrees with the
/// `event:` name are rejected.
pub fn parse_event(event: &str, data: &str) -> Result<StreamEvent, ReassembleError> {
    let parsed: StreamEvent = sonic_rs::from_str(data).map_err(ReassembleError::InvalidEvent)?;

    match &parsed {
        StreamEvent::Unknown(_) => Ok(parsed),
        known if known.name() == event => Ok(parsed),
        known => Err(ReassembleError::EventNameMismatch {
            event: event.to_string(),
            payload: known.name(),
        }),
    }
}

/// The event sequence a streaming endpoint would have produced for `message`.
pub fn events(message: &Response) -> Vec<StreamEvent> {
    let mut events = Vec::with_capacity(message.content.len() * 3 + 3);

    events.push(StreamEvent::MessageStart {
        message: Box::new(Response {
            content: Vec::new(),
            stop_reason: None,
            stop_sequence: None,
            usage: Usage {
                input_tokens: message.usage.input_tokens,
                output_tokens: 0,
            },
            ..message.clone()
        }),
    });

    for (index, block) in message.content.iter().enumerate() {
        let index = u32::try_from(index).unwrap_or(u32::MAX);

        let (placeholder, delta) = match block {
            ResponseContent::Text(block) => (
                ResponseContent::Text(ResponseTextBlock { text: String::new() }),
                Some(ContentDelta::TextDelta {
                    text: block.text.clone(),
                }),
            ),
            ResponseContent::ToolUse(block) => (
                ResponseContent::ToolUse(ResponseToolUseBlock {
                    id: block.id.clone(),
                    name: block.name.clone(),
                    input: Value::Object(Default::default()),
                }),
                Some(ContentDelta::InputJsonDelta {
                    partial_json: block.input.to_string(),
                }),
            ),
            ResponseContent::Unknown(value) => (ResponseContent::Unknown(value.clone()), None),
        };

        events.push(StreamEvent::ContentBlockStart {
            index,
            content_block: placeholder,
        });

        if let Some(delta) = delta {
            events.push(StreamEvent::ContentBlockDelta { index, delta });
        }

        events.push(StreamEvent::ContentBlockStop { index });
    }

    events.push(StreamEvent::MessageDelta {
        delta: MessageDeltaBody {
            stop_reason: message.stop_reason,
            stop_sequence: message.stop_sequence.clone(),
        },
        usage: DeltaUsage {
            output_tokens: message.usage.output_tokens,
        },
    });

    events.push(StreamEvent::MessageStop);

    events
}

/// Frames for [`events`], ready to be written to an `text/event-stream` body.
pub fn synthesize(message: &Response) -> Result<Vec<SseFrame>, TranslationError> {
    events(message).iter().map(SseFrame::new).collect()
}

/// Concatenates rendered frames into a response body.
pub fn render(frames: &[SseFrame]) -> String {
    frames.iter().map(ToString::to_string).collect()
}

#[derive(Debug, Error)]
pub enum ReassembleError {
    #[error("Invalid stream event: {0}")]
    InvalidEvent(sonic_rs::Error),

    #[error("Event '{event}' carries a '{payload}' payload")]
    EventNameMismatch { event: String, payload: &'static str },

    #[error("Stream did not start with message_start")]
    MissingMessageStart,

    #[error("Unexpected content block index {0}")]
    UnexpectedIndex(u32),

    #[error("Delta does not match the type of content block {0}")]
    MismatchedDelta(u32),

    #[error("Tool input of content block {index} is not valid JSON: {source}")]
    InvalidToolInput { index: u32, source: serde_json::Error },

    #[error("Stream reported an error: {0}")]
    Upstream(String),

    #[error("Stream ended before message_stop")]
    Incomplete,
}

/// Folds stream events back into the message they describe.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    message: Option<Response>,
    partial_json: Vec<String>,
    finished: bool,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: StreamEvent) -> Result<(), ReassembleError> {
        match event {
            StreamEvent::MessageStart { message } => {
                self.partial_json = vec![String::new(); message.content.len()];
                self.message = Some(*message);
                self.finished = false;

                return Ok(());
            }
            StreamEvent::Ping | StreamEvent::Unknown(_) => return Ok(()),
            StreamEvent::Error { error } => return Err(ReassembleError::Upstream(error.message)),
            _ => (),
        }

        let message = self.message.as_mut().ok_or(ReassembleError::MissingMessageStart)?;

        match event {
            StreamEvent::ContentBlockStart { index, content_block } => {
                if index as usize != message.content.len() {
                    return Err(ReassembleError::UnexpectedIndex(index));
                }

                message.content.push(content_block);
                self.partial_json.push(String::new());
            }
            StreamEvent::ContentBlockDelta { index, delta } => {
                let block = message
                    .content
                    .get_mut(index as usize)
                    .ok_or(ReassembleError::UnexpectedIndex(index))?;

                match (block, delta) {
                    (ResponseContent::Text(block), ContentDelta::TextDelta { text }) => block.text.push_str(&text),
                    (ResponseContent::ToolUse(_), ContentDelta::InputJsonDelta { partial_json }) => {
                        if let Some(partial) = self.partial_json.get_mut(index as usize) {
                            partial.push_str(&partial_json);
                        }
                    }
                    (_, ContentDelta::Unknown(_)) => (),
                    _ => return Err(ReassembleError::MismatchedDelta(index)),
                }
            }
            StreamEvent::ContentBlockStop { index } => {
                let block = message
                    .content
                    .get_mut(index as usize)
                    .ok_or(ReassembleError::UnexpectedIndex(index))?;

                if let ResponseContent::ToolUse(block) = block
                    && let Some(partial) = self.partial_json.get(index as usize)
                    && !partial.is_empty()
                {
                    block.input = serde_json::from_str(partial)
                        .map_err(|source| ReassembleError::InvalidToolInput { index, source })?;
                }
            }
            StreamEvent::MessageDelta { delta, usage } => {
                message.stop_reason = delta.stop_reason;
                message.stop_sequence = delta.stop_sequence;
                message.usage.output_tokens = usage.output_tokens;
            }
            StreamEvent::MessageStop => self.finished = true,
            StreamEvent::MessageStart { .. } | StreamEvent::Error { .. } | StreamEvent::Ping | StreamEvent::Unknown(_) => (),
        }

        Ok(())
    }

    /// The reassembled message. Fails unless `message_stop` was seen.
    pub fn finish(self) -> Result<Response, ReassembleError> {
        let message = self.message.ok_or(ReassembleError::MissingMessageStart)?;

        if !self.finished {
            return Err(ReassembleError::Incomplete);
        }

        Ok(message)
    }
}

pub fn reassemble(events: impl IntoIterator<Item = StreamEvent>) -> Result<Response, ReassembleError> {
    let mut accumulator = StreamAccumulator::new();

    for event in events {
        accumulator.push(event)?;
    }

    accumulator.finish()
}
