//! Comment tools: add a comment, list a ticket's comments.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use zdesk_api::ZendeskClient;
use zdesk_types::{FieldKind, Tool, ToolDefinition, ToolError, ToolSchema};

use crate::{parse_input, to_payload};

/// Add a comment to an existing ticket.
pub struct AddCommentTool {
    zendesk: Arc<ZendeskClient>,
}

impl AddCommentTool {
    pub fn new(zendesk: Arc<ZendeskClient>) -> Self {
        Self { zendesk }
    }
}

#[derive(Deserialize)]
struct AddCommentInput {
    ticket_id: u64,
    body: String,
    #[serde(default)]
    public: Option<bool>,
}

impl Tool for AddCommentTool {
    fn name(&self) -> &str {
        "add_comment"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "add_comment".to_string(),
            description: "Add a comment to a ticket. Public comments are visible to the \
                          requester; private ones only to agents. Defaults to public."
                .to_string(),
            input_schema: ToolSchema::new()
                .required("ticket_id", FieldKind::Integer, "Ticket id")
                .required("body", FieldKind::String, "Comment body")
                .optional(
                    "public",
                    FieldKind::Boolean,
                    "Whether the requester can see the comment (default true)",
                ),
        }
    }

    fn execute(
        &self,
        args: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + '_>> {
        Box::pin(async move {
            let input: AddCommentInput = parse_input("add_comment", args)?;
            let ticket = self
                .zendesk
                .add_comment(input.ticket_id, &input.body, input.public.unwrap_or(true))
                .await?;
            to_payload(&ticket)
        })
    }
}

/// List all comments on a ticket.
pub struct GetTicketCommentsTool {
    zendesk: Arc<ZendeskClient>,
}

impl GetTicketCommentsTool {
    pub fn new(zendesk: Arc<ZendeskClient>) -> Self {
        Self { zendesk }
    }
}

#[derive(Deserialize)]
struct GetTicketCommentsInput {
    ticket_id: u64,
}

impl Tool for GetTicketCommentsTool {
    fn name(&self) -> &str {
        "get_ticket_comments"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "get_ticket_comments".to_string(),
            description: "Fetch the full comment thread of a ticket, oldest first.".to_string(),
            input_schema: ToolSchema::new().required(
                "ticket_id",
                FieldKind::Integer,
                "Ticket id",
            ),
        }
    }

    fn execute(
        &self,
        args: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + '_>> {
        Box::pin(async move {
            let input: GetTicketCommentsInput = parse_input("get_ticket_comments", args)?;
            let comments = self.zendesk.list_comments(input.ticket_id).await?;
            to_payload(&serde_json::json!({"comments": comments}))
        })
    }
}
