//! Interception of outbound Messages API calls.
//!
//! [`InterceptLayer`] is a tower layer installed in front of the real network
//! service when the client is built. Calls to the configured Messages endpoint
//! are either translated to the Gemini `generateContent` API or forwarded,
//! optionally with MCP tool metadata injected. Everything else passes through
//! untouched.
//!
//! Translation never fails the caller: if anything goes wrong before a native
//! reply has been parsed, the original request is sent as-is.

mod client;
mod debug_log;
mod dispatch;
mod error;
mod layer;
mod mcp;
mod observe;
mod transport;

pub use client::{AdapterClient, open_error_cache};
pub use debug_log::{DebugLog, Direction};
pub use error::ClientError;
pub use layer::{Intercept, InterceptLayer};
pub use transport::{HttpTransport, default_http_client_builder};
