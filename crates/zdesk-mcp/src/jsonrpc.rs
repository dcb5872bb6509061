//! JSON-RPC 2.0 types for MCP communication, server side.
//!
//! Requests arrive from the peer and responses go back; the correlation id
//! is opaque to us: we echo whatever the peer sent, number or string.

use serde::{Deserialize, Serialize};

/// Standard JSON-RPC error codes used by the server.
pub mod codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
    /// Request arrived before the `initialize` handshake completed.
    pub const NOT_INITIALIZED: i64 = -32002;
}

/// Opaque correlation token pairing a response to its request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

/// An inbound JSON-RPC 2.0 request (id present, response expected).
#[derive(Debug, Clone)]
pub struct JsonRpcRequest {
    pub id: RequestId,
    pub method: String,
    pub params: Option<serde_json::Value>,
}

/// An inbound JSON-RPC 2.0 notification (no id, no response).
#[derive(Debug, Clone)]
pub struct JsonRpcNotification {
    pub method: String,
    pub params: Option<serde_json::Value>,
}

/// An outbound JSON-RPC 2.0 response.
///
/// `id` is `None` only for protocol errors on frames whose id could not be
/// decoded; it serializes as `null` per the JSON-RPC spec.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Option<RequestId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: RequestId, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id: Some(id),
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<RequestId>, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_accepts_numbers_and_strings() {
        let n: RequestId = serde_json::from_str("7").unwrap();
        assert_eq!(n, RequestId::Number(7));
        let s: RequestId = serde_json::from_str(r#""abc-1""#).unwrap();
        assert_eq!(s, RequestId::String("abc-1".into()));
    }

    #[test]
    fn request_id_rejects_other_shapes() {
        assert!(serde_json::from_str::<RequestId>("null").is_err());
        assert!(serde_json::from_str::<RequestId>("[1]").is_err());
        assert!(serde_json::from_str::<RequestId>("1.5").is_err());
    }

    #[test]
    fn serialize_success_response() {
        let resp = JsonRpcResponse::success(
            RequestId::String("1".into()),
            serde_json::json!({"ok": true}),
        );
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["id"], "1");
        assert_eq!(json["result"]["ok"], true);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn serialize_error_response() {
        let resp = JsonRpcResponse::error(
            Some(RequestId::Number(2)),
            codes::METHOD_NOT_FOUND,
            "Method not found",
        );
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["id"], 2);
        assert_eq!(json["error"]["code"], -32601);
        assert_eq!(json["error"]["message"], "Method not found");
        assert!(json.get("result").is_none());
    }

    #[test]
    fn error_response_without_id_serializes_null() {
        let resp = JsonRpcResponse::error(None, codes::PARSE_ERROR, "bad frame");
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json["id"].is_null());
    }

    #[test]
    fn response_id_echoes_peer_id_exactly() {
        // Numeric and string ids must round-trip unchanged: "1" != 1.
        let numeric = JsonRpcResponse::success(RequestId::Number(1), serde_json::json!({}));
        let string = JsonRpcResponse::success(RequestId::String("1".into()), serde_json::json!({}));
        assert_eq!(serde_json::to_value(&numeric).unwrap()["id"], 1);
        assert_eq!(serde_json::to_value(&string).unwrap()["id"], "1");
    }
}
