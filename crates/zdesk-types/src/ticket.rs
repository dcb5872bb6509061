//! Zendesk entity models.
//!
//! These are ephemeral views of state owned by Zendesk: every read is a live
//! fetch and every write a live mutation. Nothing here is cached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ticket lifecycle states, as Zendesk defines them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    New,
    Open,
    Pending,
    Hold,
    Solved,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    Urgent,
    High,
    Normal,
    Low,
}

/// A support ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: u64,
    pub subject: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TicketStatus,
    #[serde(default)]
    pub priority: Option<TicketPriority>,
    #[serde(default)]
    pub requester_id: Option<u64>,
    #[serde(default)]
    pub assignee_id: Option<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment on a ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    #[serde(default)]
    pub author_id: Option<u64>,
    pub body: String,
    /// Whether the comment is visible to the requester.
    pub public: bool,
    pub created_at: DateTime<Utc>,
}

/// A Zendesk user (agent or end user).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Fields for creating a ticket.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub subject: String,
    /// Body of the ticket's first comment.
    pub body: String,
    pub priority: Option<TicketPriority>,
    pub tags: Vec<String>,
}

/// Patch-style ticket update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TicketUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TicketPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Pagination controls for ticket listing.
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    /// Page size (server default when unset; Zendesk caps at 100).
    pub size: Option<u32>,
    /// Cursor from a previous page's `after_cursor`.
    pub after_cursor: Option<String>,
}

/// One page of tickets, driven by the backend's pagination cursor.
#[derive(Debug, Clone, Serialize)]
pub struct TicketPage {
    pub tickets: Vec<Ticket>,
    pub after_cursor: Option<String>,
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_ticket_wire_shape() {
        let json = r#"{
            "id": 42,
            "subject": "Printer on fire",
            "description": "It is very much on fire.",
            "status": "open",
            "priority": "high",
            "requester_id": 1001,
            "assignee_id": null,
            "tags": ["hardware", "urgent"],
            "created_at": "2025-03-01T10:15:00Z",
            "updated_at": "2025-03-02T08:00:00Z"
        }"#;
        let ticket: Ticket = serde_json::from_str(json).unwrap();
        assert_eq!(ticket.id, 42);
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.priority, Some(TicketPriority::High));
        assert!(ticket.assignee_id.is_none());
        assert_eq!(ticket.tags, vec!["hardware", "urgent"]);
    }

    #[test]
    fn deserialize_ticket_minimal_fields() {
        let json = r#"{
            "id": 7,
            "subject": "Hello",
            "status": "new",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        }"#;
        let ticket: Ticket = serde_json::from_str(json).unwrap();
        assert!(ticket.description.is_none());
        assert!(ticket.priority.is_none());
        assert!(ticket.tags.is_empty());
    }

    #[test]
    fn unknown_status_rejected() {
        let json = r#"{
            "id": 7,
            "subject": "Hello",
            "status": "combusting",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        }"#;
        assert!(serde_json::from_str::<Ticket>(json).is_err());
    }

    #[test]
    fn ticket_update_serializes_only_set_fields() {
        let update = TicketUpdate {
            status: Some(TicketStatus::Solved),
            ..TicketUpdate::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"status": "solved"}));
    }
}
