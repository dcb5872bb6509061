//! Built-in tools for zdesk and the registry that dispatches to them.
//!
//! Every tool holds a handle to the shared `ZendeskClient`; the handle is
//! passed in at registry construction, never reached through globals.

mod comments;
mod registry;
mod tickets;
mod users;

pub use comments::{AddCommentTool, GetTicketCommentsTool};
pub use registry::ToolRegistry;
pub use tickets::{CreateTicketTool, GetTicketTool, ListTicketsTool, UpdateTicketTool};
pub use users::GetUserTool;

use zdesk_types::ToolError;

/// Deserialize validated arguments into a tool's input struct.
///
/// Schema validation runs before dispatch, so failures here mean the schema
/// and the input struct disagree about a field; still reported as invalid
/// input rather than a fault.
fn parse_input<T: serde::de::DeserializeOwned>(
    tool: &str,
    args: serde_json::Value,
) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::InvalidInput {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

/// Serialize a tool's result entity into its JSON payload.
fn to_payload<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, ToolError> {
    serde_json::to_value(value).map_err(|e| ToolError::ExecutionFailed(e.to_string()))
}
