use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use weathernode::config::AppConfig;
use weathernode::router::create_app_router;
use weathernode::state::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("weathernode: invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    weathernode::logging::init(&config);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Server terminated");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.weather.api_key.is_none() {
        info!("WEATHER_API_KEY not set; weather lookups will fail until it is configured");
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = Arc::new(AppState::new(config)?);
    let app = create_app_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        %addr,
        rest = %format!("http://{addr}/api"),
        mcp = %format!("http://{addr}/mcp"),
        health = %format!("http://{addr}/api/health"),
        "Weathernode server started"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
