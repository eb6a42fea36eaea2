use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use serde_json::{json, Map, Value};
use tracing::{debug, error, warn};

use super::models::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallParams, ToolResult, PROTOCOL_VERSION,
    SERVER_NAME, SERVER_VERSION,
};
use super::tools::{self, ToolError};
use crate::weather::WeatherProvider;

/// How a failed tool call is reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolErrorConvention {
    /// Top-level JSON-RPC error `-32603 "Tool execution failed: ..."`.
    RpcError,
    /// Successful response carrying a `ToolResult` with `isError: true`.
    ResultFlag,
}

/// Methods this server routes. Anything else is `Method not found`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McpMethod {
    Initialize,
    ToolsList,
    ToolsCall,
}

impl McpMethod {
    pub fn from_name(method: &str) -> Option<Self> {
        match method {
            "initialize" => Some(Self::Initialize),
            "tools/list" => Some(Self::ToolsList),
            "tools/call" => Some(Self::ToolsCall),
            _ => None,
        }
    }
}

/// Turns one validated request into zero or one response.
///
/// Holds no per-call state; one instance serves every request of a transport.
pub struct McpDispatcher {
    provider: Arc<dyn WeatherProvider>,
    convention: ToolErrorConvention,
}

impl McpDispatcher {
    pub fn new(provider: Arc<dyn WeatherProvider>, convention: ToolErrorConvention) -> Self {
        Self {
            provider,
            convention,
        }
    }

    /// Dispatches `request`.
    ///
    /// Returns `None` for notifications. A request with an `id` always gets a
    /// response, including when a handler or the provider panics.
    pub async fn dispatch(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id.clone();
        let method = request.method.clone();

        match AssertUnwindSafe(self.route(request)).catch_unwind().await {
            Ok(response) => response,
            Err(panic) => {
                let detail = panic_message(panic.as_ref());
                error!(%method, %detail, "MCP handler panicked");
                id.map(|id| JsonRpcResponse::error(Some(id), JsonRpcError::internal_error(detail)))
            }
        }
    }

    async fn route(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id else {
            debug!(method = %request.method, "MCP notification acknowledged");
            return None;
        };

        debug!(method = %request.method, ?id, "MCP call");

        let outcome = match McpMethod::from_name(&request.method) {
            Some(McpMethod::Initialize) => Ok(initialize_result()),
            Some(McpMethod::ToolsList) => Ok(json!({ "tools": tools::list_tools() })),
            Some(McpMethod::ToolsCall) => self.call_tool(request.params).await,
            None => {
                warn!(method = %request.method, "Unknown MCP method");
                Err(JsonRpcError::method_not_found())
            }
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(Some(id), result),
            Err(err) => JsonRpcResponse::error(Some(id), err),
        })
    }

    async fn call_tool(&self, params: Option<Map<String, Value>>) -> Result<Value, JsonRpcError> {
        let params: ToolCallParams =
            serde_json::from_value(Value::Object(params.unwrap_or_default()))
                .map_err(JsonRpcError::internal_error)?;

        let args = match params.arguments {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(args) => args,
        };

        match tools::invoke(self.provider.as_ref(), &params.name, args).await {
            Ok(result) => to_result_value(&result),
            Err(err) => {
                warn!(tool = %params.name, error = %err, "Tool execution failed");
                self.report_failure(&err)
            }
        }
    }

    fn report_failure(&self, err: &ToolError) -> Result<Value, JsonRpcError> {
        match self.convention {
            ToolErrorConvention::RpcError => Err(JsonRpcError::tool_execution_failed(err)),
            ToolErrorConvention::ResultFlag => to_result_value(&ToolResult::error(format!("Error: {err}"))),
        }
    }
}

/// Result of `initialize`. Pure and idempotent.
pub fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": {}
        },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": SERVER_VERSION
        }
    })
}

fn to_result_value(result: &ToolResult) -> Result<Value, JsonRpcError> {
    serde_json::to_value(result).map_err(JsonRpcError::internal_error)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
