//! User tools.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use zdesk_api::ZendeskClient;
use zdesk_types::{FieldKind, Tool, ToolDefinition, ToolError, ToolSchema};

use crate::{parse_input, to_payload};

/// Fetch a single user by id.
pub struct GetUserTool {
    zendesk: Arc<ZendeskClient>,
}

impl GetUserTool {
    pub fn new(zendesk: Arc<ZendeskClient>) -> Self {
        Self { zendesk }
    }
}

#[derive(Deserialize)]
struct GetUserInput {
    id: u64,
}

impl Tool for GetUserTool {
    fn name(&self) -> &str {
        "get_user"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "get_user".to_string(),
            description: "Fetch a Zendesk user (requester or agent) by id.".to_string(),
            input_schema: ToolSchema::new().required("id", FieldKind::Integer, "User id"),
        }
    }

    fn execute(
        &self,
        args: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + '_>> {
        Box::pin(async move {
            let input: GetUserInput = parse_input("get_user", args)?;
            let user = self.zendesk.get_user(input.id).await?;
            to_payload(&user)
        })
    }
}
