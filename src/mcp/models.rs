//! MCP Protocol Models and Constants
//!
//! JSON-RPC 2.0 envelopes, error codes and the MCP tool result shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// MCP Constants
// =============================================================================

/// Server identifier reported by `initialize`
pub const SERVER_NAME: &str = "weathernode";
/// Server version reported by `initialize`
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Protocol version for MCP
pub const PROTOCOL_VERSION: &str = "2024-11-05";
/// JSON-RPC version tag carried on every message
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC error codes used on the wire.
pub mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INTERNAL_ERROR: i32 = -32603;
    /// Server-defined range; only the stream transport emits it.
    pub const RATE_LIMITED: i32 = -32000;
}

// =============================================================================
// Requests
// =============================================================================

/// JSON-RPC 2.0 ID: a number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(serde_json::Number),
    Str(String),
}

/// Standard JSON-RPC 2.0 Request envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version (validated to be "2.0" before dispatch)
    pub jsonrpc: String,

    /// Request identifier; absent for notifications
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RpcId>,

    /// Method name to invoke
    pub method: String,

    /// Parameters for the method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
}

impl JsonRpcRequest {
    pub fn new(id: Option<RpcId>, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params: params.and_then(|p| match p {
                Value::Object(map) => Some(map),
                _ => None,
            }),
        }
    }

    /// A request without an `id` expects no response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Parameters for `tools/call`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

// =============================================================================
// Responses
// =============================================================================

/// JSON-RPC 2.0 response envelope. Exactly one of `result` / `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    /// Serialized as `null` when the request id could not be determined.
    pub id: Option<RpcId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<RpcId>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<RpcId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn parse_error(details: Vec<String>) -> Self {
        Self {
            code: codes::PARSE_ERROR,
            message: "Parse error".into(),
            data: Some(Value::from(details)),
        }
    }

    pub fn method_not_found() -> Self {
        Self {
            code: codes::METHOD_NOT_FOUND,
            message: "Method not found".into(),
            data: None,
        }
    }

    pub fn internal_error(detail: impl std::fmt::Display) -> Self {
        Self {
            code: codes::INTERNAL_ERROR,
            message: format!("Internal error: {detail}"),
            data: None,
        }
    }

    pub fn tool_execution_failed(detail: impl std::fmt::Display) -> Self {
        Self {
            code: codes::INTERNAL_ERROR,
            message: format!("Tool execution failed: {detail}"),
            data: None,
        }
    }

    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self {
            code: codes::RATE_LIMITED,
            message: "Rate limit exceeded".into(),
            data: Some(serde_json::json!({ "retryAfter": retry_after_secs })),
        }
    }
}

// =============================================================================
// Tool results
// =============================================================================

/// MCP tool call result, returned inside a successful JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ToolResultContent>,
    #[serde(
        rename = "isError",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub is_error: bool,
}

/// A single content block inside a tool result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResultContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolResultContent {
                content_type: "text".into(),
                text: text.into(),
            }],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::text(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_keep_their_wire_type() {
        let numeric: RpcId = serde_json::from_value(json!(7)).unwrap();
        let text: RpcId = serde_json::from_value(json!("abc")).unwrap();
        assert_eq!(serde_json::to_value(&numeric).unwrap(), json!(7));
        assert_eq!(serde_json::to_value(&text).unwrap(), json!("abc"));
    }

    #[test]
    fn success_envelope_has_no_error_field() {
        let resp = JsonRpcResponse::success(Some(RpcId::Str("a".into())), json!({"ok": true}));
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value, json!({"jsonrpc": "2.0", "id": "a", "result": {"ok": true}}));
    }

    #[test]
    fn error_envelope_serializes_null_id() {
        let resp = JsonRpcResponse::error(None, JsonRpcError::parse_error(vec!["bad".into()]));
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            value,
            json!({
                "jsonrpc": "2.0",
                "id": null,
                "error": { "code": -32700, "message": "Parse error", "data": ["bad"] }
            })
        );
    }

    #[test]
    fn tool_result_omits_is_error_on_success() {
        let ok = serde_json::to_value(ToolResult::text("hi")).unwrap();
        assert_eq!(ok, json!({"content": [{"type": "text", "text": "hi"}]}));

        let failed = serde_json::to_value(ToolResult::error("boom")).unwrap();
        assert_eq!(failed["isError"], true);
    }
}
