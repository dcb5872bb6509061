//! Request dispatch: registry lookup, argument validation, handler
//! invocation.
//!
//! Every failure mode converts to an error result at this boundary; a bad
//! request can never take the process down or desynchronize the stream.

use zdesk_mcp::protocol::{CallToolParams, CallToolResult};
use zdesk_tools::ToolRegistry;
use zdesk_types::ToolError;

/// Resolve and run one tool call.
///
/// The returned result is a success payload or an error carrying one of the
/// stable kind strings (ToolNotFound, InvalidArguments, UpstreamTransient,
/// UpstreamRejected, HandlerFault). This function never returns `Err` and
/// never panics on peer input.
pub async fn dispatch(registry: &ToolRegistry, params: CallToolParams) -> CallToolResult {
    let Some(tool) = registry.lookup(&params.name) else {
        let err = ToolError::UnknownTool { name: params.name };
        return CallToolResult::error(err.kind(), err);
    };

    // Validate before the handler runs: a rejected call must not reach the
    // ticketing backend.
    let definition = tool.definition();
    if let Err(e) = definition.input_schema.validate(&params.arguments) {
        tracing::debug!(tool = %params.name, "rejected arguments: {e}");
        return CallToolResult::error("InvalidArguments", e);
    }

    match tool.execute(params.arguments).await {
        Ok(payload) => CallToolResult::success(&payload),
        Err(e) => {
            tracing::warn!(tool = %params.name, "tool call failed: {e}");
            CallToolResult::error(e.kind(), e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use zdesk_api::ZendeskClient;

    fn registry() -> ToolRegistry {
        // Points at a real client that is never reached in these tests.
        let client =
            Arc::new(ZendeskClient::new("testco", "agent@testco.example", "token").unwrap());
        ToolRegistry::with_builtins(client)
    }

    fn result_text(result: &CallToolResult) -> String {
        let json = serde_json::to_value(result).unwrap();
        json["content"][0]["text"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn unknown_tool_is_not_found() {
        let result = dispatch(
            &registry(),
            CallToolParams {
                name: "nope".into(),
                arguments: json!({}),
            },
        )
        .await;
        assert!(result.is_error);
        assert_eq!(result_text(&result), "ToolNotFound: no tool named 'nope'");
    }

    #[tokio::test]
    async fn missing_required_field_is_invalid_arguments() {
        let result = dispatch(
            &registry(),
            CallToolParams {
                name: "get_ticket".into(),
                arguments: json!({}),
            },
        )
        .await;
        assert!(result.is_error);
        assert_eq!(
            result_text(&result),
            "InvalidArguments: missing required field 'id'"
        );
    }

    #[tokio::test]
    async fn wrong_type_is_invalid_arguments() {
        let result = dispatch(
            &registry(),
            CallToolParams {
                name: "get_ticket".into(),
                arguments: json!({"id": "forty-two"}),
            },
        )
        .await;
        assert!(result.is_error);
        assert_eq!(
            result_text(&result),
            "InvalidArguments: field 'id' must be an integer"
        );
    }
}
