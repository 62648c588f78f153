//! Wire types for both sides of the bridge.

pub mod anthropic;
pub mod gemini;
mod lenient;
pub mod unknown_fields;
