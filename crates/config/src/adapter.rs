use std::path::PathBuf;

use serde::Deserialize;

/// Behavior of the interception layer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdapterConfig {
    /// Path of the Messages endpoint, relative to the provider base URL.
    pub messages_path: String,
    /// Add `_intent` and `_displayName` parameters to MCP tools on pass-through requests.
    pub inject_mcp_metadata: bool,
    /// Tool name prefix marking a tool as contributed by an MCP server.
    pub mcp_tool_prefix: String,
    /// File receiving request/response traces. Disabled when unset.
    pub debug_log: Option<PathBuf>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            messages_path: "/v1/messages".to_string(),
            inject_mcp_metadata: false,
            mcp_tool_prefix: "mcp__".to_string(),
            debug_log: None,
        }
    }
}
