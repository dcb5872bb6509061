//! MCP wire protocol for zdesk.
//!
//! Speaks newline-delimited JSON-RPC 2.0 over a duplex byte channel (stdio
//! in production). This crate owns message framing and the protocol payload
//! shapes; request dispatch lives in zdesk-core.

pub mod jsonrpc;
pub mod protocol;
pub mod transport;

pub use jsonrpc::{JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RequestId};
pub use protocol::{CallToolParams, CallToolResult, Content, InitializeResult, ToolEntry};
pub use transport::{Inbound, ResponseSender, Transport, TransportError};
