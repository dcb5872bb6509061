//! MCP protocol payloads, server side.
//!
//! Shapes follow the MCP schema: camelCase field names on the wire,
//! tool results carrying content blocks with an `isError` marker.

use serde::{Deserialize, Serialize};

/// MCP protocol version this server speaks.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Result of the `initialize` handshake.
#[derive(Debug, Clone, Serialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: &'static str,
    pub capabilities: Capabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct Capabilities {
    pub tools: ToolsCapability,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolsCapability {
    /// The tool set is fixed at startup; we never emit list-changed events.
    #[serde(rename = "listChanged")]
    pub list_changed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

impl InitializeResult {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            capabilities: Capabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: name.into(),
                version: version.into(),
            },
        }
    }
}

/// One entry in the `tools/list` advertisement.
#[derive(Debug, Clone, Serialize)]
pub struct ToolEntry {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// Parameters of a `tools/call` request.
#[derive(Debug, Clone, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    /// Absent arguments validate as an empty object.
    #[serde(default)]
    pub arguments: serde_json::Value,
}

/// A content item in a tool result.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Text { text: String },
}

/// Result of a `tools/call`, success or tool-level failure.
///
/// Tool-level failures ride inside the JSON-RPC result with `isError` set;
/// only protocol-level failures become JSON-RPC error objects.
#[derive(Debug, Clone, Serialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl CallToolResult {
    /// Wrap a successful tool payload.
    pub fn success(payload: &serde_json::Value) -> Self {
        let text = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
        Self {
            content: vec![Content::Text { text }],
            is_error: false,
        }
    }

    /// Wrap a tool failure as `"<kind>: <message>"`.
    pub fn error(kind: &str, message: impl std::fmt::Display) -> Self {
        Self {
            content: vec![Content::Text {
                text: format!("{kind}: {message}"),
            }],
            is_error: true,
        }
    }
}
