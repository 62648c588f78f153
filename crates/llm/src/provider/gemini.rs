//! Messages protocol on top of the Gemini `generateContent` API.
//!
//! The upstream call is always non-streaming. Streaming callers get a
//! synthesized event stream built from the complete reply, see
//! [`crate::stream`].

mod contents;
mod input;
mod output;
mod schema;

use serde_json::Number;

pub use contents::{ToolCallCorrelation, build_contents};
pub use input::{build_native_request, native_url};
pub use output::{Assembled, assemble, assemble_message};
pub use schema::translate;

/// Header carrying the Gemini API key.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Message of the synthetic 401 returned when no key is configured.
pub const MISSING_API_KEY_MESSAGE: &str = "Missing API key for Gemini provider";

/// JSON number for `value`, as an integer when it has no fractional part.
pub(crate) fn json_number(value: f64) -> Option<Number> {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        Some(Number::from(value as i64))
    } else {
        Number::from_f64(value)
    }
}
