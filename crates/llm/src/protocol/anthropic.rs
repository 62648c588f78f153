//! The Messages protocol spoken by the agent runtime.

pub mod error;
pub mod messages;
