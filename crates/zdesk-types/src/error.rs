//! Error hierarchy for zdesk.

use thiserror::Error;

/// Errors from the Zendesk REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Server error: {status} {message}")]
    Server { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Response decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether a retry within the policy budget could plausibly succeed.
    ///
    /// Rate limits, 5xx responses, network failures, and timeouts are
    /// transient; everything else surfaces immediately.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ApiError::RateLimited { .. }
                | ApiError::Server { .. }
                | ApiError::Network(_)
                | ApiError::Timeout
        )
    }
}

/// Errors from tool dispatch and execution.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("no tool named '{name}'")]
    UnknownTool { name: String },

    #[error("Invalid input for tool '{tool}': {message}")]
    InvalidInput { tool: String, message: String },

    #[error(transparent)]
    Upstream(#[from] ApiError),

    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),
}

impl ToolError {
    /// Stable kind string surfaced to the peer in error results.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::UnknownTool { .. } => "ToolNotFound",
            ToolError::InvalidInput { .. } => "InvalidArguments",
            ToolError::Upstream(e) if e.is_transient() => "UpstreamTransient",
            ToolError::Upstream(_) => "UpstreamRejected",
            ToolError::ExecutionFailed(_) => "HandlerFault",
        }
    }
}

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file parse error at {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Missing required configuration: {key}")]
    MissingKey { key: String },

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(
            ApiError::RateLimited {
                retry_after_ms: None
            }
            .is_transient()
        );
        assert!(
            ApiError::Server {
                status: 503,
                message: "maintenance".into()
            }
            .is_transient()
        );
        assert!(ApiError::Network("connection reset".into()).is_transient());
        assert!(ApiError::Timeout.is_transient());

        assert!(
            !ApiError::Auth {
                message: "bad token".into()
            }
            .is_transient()
        );
        assert!(
            !ApiError::NotFound {
                resource: "ticket 42".into()
            }
            .is_transient()
        );
        assert!(!ApiError::Decode("truncated body".into()).is_transient());
    }

    #[test]
    fn tool_error_kinds() {
        assert_eq!(
            ToolError::UnknownTool { name: "nope".into() }.kind(),
            "ToolNotFound"
        );
        assert_eq!(
            ToolError::InvalidInput {
                tool: "get_ticket".into(),
                message: "missing id".into()
            }
            .kind(),
            "InvalidArguments"
        );
        assert_eq!(
            ToolError::Upstream(ApiError::Timeout).kind(),
            "UpstreamTransient"
        );
        assert_eq!(
            ToolError::Upstream(ApiError::NotFound {
                resource: "ticket 42".into()
            })
            .kind(),
            "UpstreamRejected"
        );
        assert_eq!(
            ToolError::ExecutionFailed("oops".into()).kind(),
            "HandlerFault"
        );
    }
}
