//! Application State Management
//!
//! Everything a request handler can reach. Components are built once at
//! startup and injected here; nothing lives in process-wide globals.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::error::WeatherError;
use crate::mcp::{McpDispatcher, ToolErrorConvention};
use crate::monitoring::RequestLog;
use crate::rate_limit::RateLimiter;
use crate::weather::{WeatherProvider, WeatherService};

/// Shared application state that can be safely passed between threads
pub type SharedState = Arc<AppState>;

/// Core application state
pub struct AppState {
    pub config: AppConfig,

    /// Backend used by the REST handlers and the MCP dispatcher.
    pub provider: Arc<dyn WeatherProvider>,

    /// Dispatcher behind `POST /mcp`. Reports tool failures as JSON-RPC errors.
    pub mcp: Arc<McpDispatcher>,

    /// Admission control for `/api`.
    pub api_limiter: Arc<RateLimiter>,

    /// Admission control for `/mcp`. Independent of `api_limiter`.
    pub mcp_limiter: Arc<RateLimiter>,

    pub request_log: Arc<RequestLog>,

    pub started_at: Instant,
}

impl AppState {
    /// Builds state backed by the WeatherAPI.com provider.
    pub fn new(config: AppConfig) -> Result<Self, WeatherError> {
        let provider = WeatherService::new(config.weather.clone())?;
        Ok(Self::with_provider(config, Arc::new(provider)))
    }

    /// Builds state around an arbitrary provider.
    pub fn with_provider(config: AppConfig, provider: Arc<dyn WeatherProvider>) -> Self {
        let mcp = Arc::new(McpDispatcher::new(
            Arc::clone(&provider),
            ToolErrorConvention::RpcError,
        ));

        Self {
            api_limiter: Arc::new(RateLimiter::from_config(config.api_rate_limit)),
            mcp_limiter: Arc::new(RateLimiter::from_config(config.mcp_rate_limit)),
            request_log: Arc::new(RequestLog::new(config.request_log_capacity)),
            provider,
            mcp,
            config,
            started_at: Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
