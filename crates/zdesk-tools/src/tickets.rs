//! Ticket tools: fetch, list, create, update.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use zdesk_api::ZendeskClient;
use zdesk_types::{
    FieldKind, NewTicket, PageRequest, TicketPriority, TicketStatus, TicketUpdate, Tool,
    ToolDefinition, ToolError, ToolSchema,
};

use crate::{parse_input, to_payload};

/// Fetch a single ticket by id.
pub struct GetTicketTool {
    zendesk: Arc<ZendeskClient>,
}

impl GetTicketTool {
    pub fn new(zendesk: Arc<ZendeskClient>) -> Self {
        Self { zendesk }
    }
}

#[derive(Deserialize)]
struct GetTicketInput {
    id: u64,
}

impl Tool for GetTicketTool {
    fn name(&self) -> &str {
        "get_ticket"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "get_ticket".to_string(),
            description: "Fetch a single Zendesk ticket by id, including status, priority, \
                          requester, and tags."
                .to_string(),
            input_schema: ToolSchema::new().required("id", FieldKind::Integer, "Ticket id"),
        }
    }

    fn execute(
        &self,
        args: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + '_>> {
        Box::pin(async move {
            let input: GetTicketInput = parse_input("get_ticket", args)?;
            let ticket = self.zendesk.get_ticket(input.id).await?;
            to_payload(&ticket)
        })
    }
}

/// List tickets one page at a time, driven by the service's cursor.
pub struct ListTicketsTool {
    zendesk: Arc<ZendeskClient>,
}

impl ListTicketsTool {
    pub fn new(zendesk: Arc<ZendeskClient>) -> Self {
        Self { zendesk }
    }
}

#[derive(Deserialize)]
struct ListTicketsInput {
    #[serde(default)]
    page_size: Option<u32>,
    #[serde(default)]
    cursor: Option<String>,
}

impl Tool for ListTicketsTool {
    fn name(&self) -> &str {
        "list_tickets"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "list_tickets".to_string(),
            description: "List tickets, one page per call. Pass the cursor from a previous \
                          page to continue where it left off."
                .to_string(),
            input_schema: ToolSchema::new()
                .optional(
                    "page_size",
                    FieldKind::Integer,
                    "Tickets per page (max 100)",
                )
                .optional(
                    "cursor",
                    FieldKind::String,
                    "Pagination cursor from a previous page",
                ),
        }
    }

    fn execute(
        &self,
        args: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + '_>> {
        Box::pin(async move {
            let input: ListTicketsInput = parse_input("list_tickets", args)?;
            let page = self
                .zendesk
                .list_tickets(&PageRequest {
                    size: input.page_size,
                    after_cursor: input.cursor,
                })
                .await?;
            to_payload(&page)
        })
    }
}

/// Create a ticket with an initial comment.
pub struct CreateTicketTool {
    zendesk: Arc<ZendeskClient>,
}

impl CreateTicketTool {
    pub fn new(zendesk: Arc<ZendeskClient>) -> Self {
        Self { zendesk }
    }
}

#[derive(Deserialize)]
struct CreateTicketInput {
    subject: String,
    body: String,
    #[serde(default)]
    priority: Option<TicketPriority>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

impl Tool for CreateTicketTool {
    fn name(&self) -> &str {
        "create_ticket"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "create_ticket".to_string(),
            description: "Create a new ticket with a subject and an initial comment body."
                .to_string(),
            input_schema: ToolSchema::new()
                .required("subject", FieldKind::String, "Ticket subject")
                .required("body", FieldKind::String, "Body of the initial comment")
                .optional(
                    "priority",
                    FieldKind::String,
                    "Priority: urgent, high, normal, or low",
                )
                .optional("tags", FieldKind::StringArray, "Tags to apply"),
        }
    }

    fn execute(
        &self,
        args: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + '_>> {
        Box::pin(async move {
            let input: CreateTicketInput = parse_input("create_ticket", args)?;
            let ticket = self
                .zendesk
                .create_ticket(&NewTicket {
                    subject: input.subject,
                    body: input.body,
                    priority: input.priority,
                    tags: input.tags.unwrap_or_default(),
                })
                .await?;
            to_payload(&ticket)
        })
    }
}

/// Apply a partial update to a ticket.
pub struct UpdateTicketTool {
    zendesk: Arc<ZendeskClient>,
}

impl UpdateTicketTool {
    pub fn new(zendesk: Arc<ZendeskClient>) -> Self {
        Self { zendesk }
    }
}

#[derive(Deserialize)]
struct UpdateTicketInput {
    id: u64,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    status: Option<TicketStatus>,
    #[serde(default)]
    priority: Option<TicketPriority>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

impl Tool for UpdateTicketTool {
    fn name(&self) -> &str {
        "update_ticket"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "update_ticket".to_string(),
            description: "Update a ticket's subject, status, priority, or tags. Omitted \
                          fields are left untouched."
                .to_string(),
            input_schema: ToolSchema::new()
                .required("id", FieldKind::Integer, "Ticket id")
                .optional("subject", FieldKind::String, "New subject")
                .optional(
                    "status",
                    FieldKind::String,
                    "Status: new, open, pending, hold, solved, or closed",
                )
                .optional(
                    "priority",
                    FieldKind::String,
                    "Priority: urgent, high, normal, or low",
                )
                .optional("tags", FieldKind::StringArray, "Replacement tag set"),
        }
    }

    fn execute(
        &self,
        args: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + '_>> {
        Box::pin(async move {
            let input: UpdateTicketInput = parse_input("update_ticket", args)?;
            let ticket = self
                .zendesk
                .update_ticket(
                    input.id,
                    &TicketUpdate {
                        subject: input.subject,
                        status: input.status,
                        priority: input.priority,
                        tags: input.tags,
                    },
                )
                .await?;
            to_payload(&ticket)
        })
    }
}
