//! Tool trait and related types.

use std::future::Future;
use std::pin::Pin;

use crate::error::ToolError;
use crate::schema::ToolSchema;

/// A tool's advertised surface: name, description, and input schema.
///
/// Output shapes are documented per tool but not enforced on the way out;
/// handlers return serde-shaped entities whose structure the type system
/// already guarantees.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: ToolSchema,
}

/// Trait that all tools must implement.
///
/// A tool is a named, schema-described operation exposed to the peer and
/// fulfilled against the ticketing backend. Handlers receive arguments that
/// have already passed schema validation and return a JSON payload; the
/// dispatcher owns the wire framing around it.
pub trait Tool: Send + Sync {
    /// The unique name of this tool (the `tools/call` key).
    fn name(&self) -> &str;

    /// The definition advertised via `tools/list`.
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with the given JSON arguments.
    fn execute(
        &self,
        args: serde_json::Value,
    ) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, ToolError>> + Send + '_>>;
}
