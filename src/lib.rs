//! Weathernode Library
//!
//! Weather lookups exposed as a REST API and as MCP (Model Context Protocol)
//! tools, over HTTP and over newline-delimited stdio.

// Domain modules
pub mod mcp;
pub mod weather;

// Surfaces
pub mod api;
pub mod monitoring;

// Infrastructure
pub mod config;
pub mod error;
pub mod logging;
pub mod rate_limit;
pub mod router;
pub mod state;
