//! MCP over stdio: one JSON-RPC message per line on stdin, responses on stdout.

use std::process::ExitCode;
use std::sync::Arc;

use tokio::io::BufReader;
use tracing::{error, info};
use weathernode::config::AppConfig;
use weathernode::mcp::{McpDispatcher, StreamTransport, ToolErrorConvention};
use weathernode::rate_limit::RateLimiter;
use weathernode::weather::WeatherService;

/// Admission key shared by everything arriving on stdin.
const STDIO_CLIENT: &str = "stdio";

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("weathernode-mcp: invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    weathernode::logging::init(&config);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "MCP stdio server terminated");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let provider = Arc::new(WeatherService::new(config.weather.clone())?);
    let dispatcher = Arc::new(McpDispatcher::new(provider, ToolErrorConvention::ResultFlag));
    let limiter = Arc::new(RateLimiter::from_config(config.mcp_rate_limit));

    info!("Weathernode MCP server running on stdio");
    StreamTransport::new(dispatcher)
        .with_admission(limiter, STDIO_CLIENT)
        .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;
    Ok(())
}
