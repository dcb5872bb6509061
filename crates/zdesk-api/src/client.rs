//! Zendesk Support API client.

use std::time::Duration;

use reqwest::Method;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use zdesk_types::{
    ApiError, Comment, NewTicket, PageRequest, Ticket, TicketPage, TicketUpdate, User,
};

use crate::retry::{RetryPolicy, backoff_delay};

/// Default timeout for one request attempt.
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Zendesk caps cursor pages at 100 results.
const MAX_PAGE_SIZE: u32 = 100;

/// Client for the Zendesk Support API.
///
/// Cheap to clone; the underlying connection pool is shared and safe to use
/// from concurrently dispatched handlers.
#[derive(Clone)]
pub struct ZendeskClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    token: String,
    retry: RetryPolicy,
}

impl ZendeskClient {
    /// Create a client for `https://{subdomain}.zendesk.com/api/v2`,
    /// authenticating as `{email}/token` with the given API token.
    pub fn new(
        subdomain: impl AsRef<str>,
        email: impl AsRef<str>,
        api_token: impl Into<String>,
    ) -> Result<Self, ApiError> {
        Self::with_timeout(
            subdomain,
            email,
            api_token,
            Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        )
    }

    /// Create a client with a custom per-attempt request timeout.
    pub fn with_timeout(
        subdomain: impl AsRef<str>,
        email: impl AsRef<str>,
        api_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: format!("https://{}.zendesk.com/api/v2", subdomain.as_ref()),
            username: format!("{}/token", email.as_ref()),
            token: api_token.into(),
            retry: RetryPolicy::default(),
        })
    }

    /// Override the API base URL (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the retry policy for transient errors (timeouts, 429, 5xx).
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Fetch a single ticket.
    pub async fn get_ticket(&self, id: u64) -> Result<Ticket, ApiError> {
        let wrapper: TicketWrapper = self
            .execute(
                Method::GET,
                &format!("/tickets/{id}.json"),
                &[],
                None,
                &format!("ticket {id}"),
            )
            .await?;
        Ok(wrapper.ticket)
    }

    /// Fetch one page of tickets, driven by the service's pagination cursor.
    /// Never pre-fetches beyond the requested page.
    pub async fn list_tickets(&self, page: &PageRequest) -> Result<TicketPage, ApiError> {
        let mut query = Vec::new();
        if let Some(size) = page.size {
            query.push(("page[size]".to_string(), size.min(MAX_PAGE_SIZE).to_string()));
        }
        if let Some(cursor) = &page.after_cursor {
            query.push(("page[after]".to_string(), cursor.clone()));
        }

        let wrapper: TicketListWrapper = self
            .execute(Method::GET, "/tickets.json", &query, None, "tickets")
            .await?;
        Ok(TicketPage {
            tickets: wrapper.tickets,
            after_cursor: wrapper.meta.after_cursor,
            has_more: wrapper.meta.has_more,
        })
    }

    /// Create a ticket with an initial comment.
    pub async fn create_ticket(&self, new: &NewTicket) -> Result<Ticket, ApiError> {
        let mut ticket = json!({
            "subject": new.subject,
            "comment": {"body": new.body},
        });
        if let Some(priority) = new.priority {
            ticket["priority"] = serde_json::to_value(priority)
                .map_err(|e| ApiError::Decode(e.to_string()))?;
        }
        if !new.tags.is_empty() {
            ticket["tags"] = json!(new.tags);
        }

        let wrapper: TicketWrapper = self
            .execute(
                Method::POST,
                "/tickets.json",
                &[],
                Some(json!({"ticket": ticket})),
                "ticket",
            )
            .await?;
        Ok(wrapper.ticket)
    }

    /// Apply a partial update to a ticket.
    pub async fn update_ticket(&self, id: u64, update: &TicketUpdate) -> Result<Ticket, ApiError> {
        let body = json!({
            "ticket": serde_json::to_value(update).map_err(|e| ApiError::Decode(e.to_string()))?
        });
        let wrapper: TicketWrapper = self
            .execute(
                Method::PUT,
                &format!("/tickets/{id}.json"),
                &[],
                Some(body),
                &format!("ticket {id}"),
            )
            .await?;
        Ok(wrapper.ticket)
    }

    /// Add a comment to a ticket. Public comments are visible to the
    /// requester; private ones only to agents.
    pub async fn add_comment(
        &self,
        ticket_id: u64,
        body: impl AsRef<str>,
        public: bool,
    ) -> Result<Ticket, ApiError> {
        let payload = json!({
            "ticket": {
                "comment": {"body": body.as_ref(), "public": public}
            }
        });
        let wrapper: TicketWrapper = self
            .execute(
                Method::PUT,
                &format!("/tickets/{ticket_id}.json"),
                &[],
                Some(payload),
                &format!("ticket {ticket_id}"),
            )
            .await?;
        Ok(wrapper.ticket)
    }

    /// Fetch all comments on a ticket.
    pub async fn list_comments(&self, ticket_id: u64) -> Result<Vec<Comment>, ApiError> {
        let wrapper: CommentsWrapper = self
            .execute(
                Method::GET,
                &format!("/tickets/{ticket_id}/comments.json"),
                &[],
                None,
                &format!("ticket {ticket_id}"),
            )
            .await?;
        Ok(wrapper.comments)
    }

    /// Fetch a single user.
    pub async fn get_user(&self, id: u64) -> Result<User, ApiError> {
        let wrapper: UserWrapper = self
            .execute(
                Method::GET,
                &format!("/users/{id}.json"),
                &[],
                None,
                &format!("user {id}"),
            )
            .await?;
        Ok(wrapper.user)
    }

    /// One API round trip with the shared retry loop.
    ///
    /// `resource` names what is being addressed, for not-found errors.
    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<Value>,
        resource: &str,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);

        for attempt in 0..=self.retry.max_retries {
            let mut request = self
                .http
                .request(method.clone(), &url)
                .basic_auth(&self.username, Some(&self.token));
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(body) = &body {
                request = request.json(body);
            }

            tracing::debug!(
                "{method} {url} (attempt {}/{})",
                attempt + 1,
                self.retry.max_retries + 1
            );

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<T>()
                            .await
                            .map_err(|e| ApiError::Decode(e.to_string()));
                    }

                    let retry_after = parse_retry_after(response.headers());
                    let body_text = response.text().await.unwrap_or_default();
                    let err = classify_status(status.as_u16(), &body_text, retry_after, resource);

                    if !err.is_transient() || attempt == self.retry.max_retries {
                        return Err(err);
                    }

                    let delay = backoff_delay(&self.retry, attempt, retry_after);
                    tracing::warn!(
                        "retryable Zendesk error (attempt {}/{}): {err}; retrying in {delay}ms",
                        attempt + 1,
                        self.retry.max_retries + 1,
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(e) => {
                    let err = if e.is_timeout() {
                        ApiError::Timeout
                    } else {
                        ApiError::Network(e.to_string())
                    };

                    if attempt == self.retry.max_retries {
                        return Err(err);
                    }

                    let delay = backoff_delay(&self.retry, attempt, None);
                    tracing::warn!(
                        "retryable network error (attempt {}/{}): {err}; retrying in {delay}ms",
                        attempt + 1,
                        self.retry.max_retries + 1,
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
            }
        }

        unreachable!("retry loop returns on the last attempt")
    }
}

/// Wire wrappers: Zendesk nests every entity under a keyed object.
#[derive(Deserialize)]
struct TicketWrapper {
    ticket: Ticket,
}

#[derive(Deserialize)]
struct TicketListWrapper {
    tickets: Vec<Ticket>,
    #[serde(default)]
    meta: PageMeta,
}

#[derive(Deserialize, Default)]
struct PageMeta {
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    after_cursor: Option<String>,
}

#[derive(Deserialize)]
struct CommentsWrapper {
    comments: Vec<Comment>,
}

#[derive(Deserialize)]
struct UserWrapper {
    user: User,
}

/// Parse the `Retry-After` header value as seconds, converted to millis.
fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<f64>().ok())
        .map(|secs| (secs * 1000.0) as u64)
}

/// Classify an HTTP error response into a typed ApiError.
fn classify_status(status: u16, body: &str, retry_after: Option<u64>, resource: &str) -> ApiError {
    let message = parse_error_body(body).unwrap_or_else(|| body.to_string());

    match status {
        401 => ApiError::Auth { message },
        403 => ApiError::PermissionDenied { message },
        404 => ApiError::NotFound {
            resource: resource.to_string(),
        },
        400 | 422 => ApiError::BadRequest { message },
        429 => ApiError::RateLimited {
            retry_after_ms: retry_after,
        },
        _ => ApiError::Server { status, message },
    }
}

/// Best-effort extraction of a human-readable message from Zendesk's error
/// bodies, which come in two shapes:
/// `{"error": "RecordNotFound", "description": "..."}` and
/// `{"error": {"title": "...", "message": "..."}}`.
fn parse_error_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    if let Some(description) = value.get("description").and_then(Value::as_str) {
        return Some(description.to_string());
    }
    match value.get("error")? {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => obj
            .get("message")
            .or_else(|| obj.get("title"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}
