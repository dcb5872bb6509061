//! Shared types and error hierarchy for zdesk.

pub mod error;
pub mod schema;
pub mod ticket;
pub mod tool;

pub use error::{ApiError, ConfigError, ToolError};
pub use schema::{FieldKind, FieldSpec, SchemaError, ToolSchema};
pub use ticket::*;
pub use tool::{Tool, ToolDefinition};
