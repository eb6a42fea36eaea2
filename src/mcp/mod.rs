//! Model Context Protocol (MCP) Module
//!
//! This module contains the MCP protocol implementation, including:
//! - Protocol models (JSON-RPC envelopes, error codes, tool results)
//! - Envelope validation run before dispatch
//! - The tool registry and the method dispatcher
//! - Transports: HTTP `POST /mcp` and newline-delimited streams

pub mod dispatcher;
pub mod handlers;
pub mod models;
pub mod stream;
pub mod tools;
pub mod validation;

// Re-export commonly used types and functions
pub use dispatcher::{McpDispatcher, McpMethod, ToolErrorConvention};
pub use handlers::routes;
pub use stream::StreamTransport;
pub use tools::{list_tools, ToolDescriptor, ToolError, WeatherTool};
