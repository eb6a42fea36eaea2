//! REST API handlers for weather lookups and health checks

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use super::query::WeatherQuery;
use crate::error::WeatherError;
use crate::mcp::models::{SERVER_NAME, SERVER_VERSION};
use crate::state::{AppState, SharedState};
use crate::weather::DEFAULT_FORECAST_DAYS;

/// Creates routes mounted under `/api`
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/weather", get(current_weather))
        .route("/forecast", get(forecast))
        .route("/local", get(local_weather))
        .route("/health", get(health))
        .route("/health/detailed", get(health_detailed))
}

/// Endpoint: GET /api/weather?city=London
async fn current_weather(
    State(state): State<SharedState>,
    Extension(query): Extension<WeatherQuery>,
) -> Response {
    let result = state.provider.current(query.city.as_deref()).await;
    respond(
        result,
        || format!("Could not fetch weather data for {}", location(&query)),
        "Failed to fetch weather",
    )
}

/// Endpoint: GET /api/forecast?city=London&days=3
async fn forecast(
    State(state): State<SharedState>,
    Extension(query): Extension<WeatherQuery>,
) -> Response {
    let days = query.days.unwrap_or(DEFAULT_FORECAST_DAYS);
    let result = state.provider.forecast(query.city.as_deref(), days).await;
    respond(
        result,
        || format!("Could not fetch forecast data for {}", location(&query)),
        "Failed to fetch forecast",
    )
}

/// Endpoint: GET /api/local
async fn local_weather(State(state): State<SharedState>) -> Response {
    let result = state.provider.local().await;
    respond(
        result,
        || "Could not fetch weather data for default location".to_string(),
        "Failed to fetch local weather",
    )
}

/// Endpoint: GET /api/health
async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    Json(health_body(&state))
}

/// Endpoint: GET /api/health/detailed
async fn health_detailed(State(state): State<SharedState>) -> impl IntoResponse {
    let mut body = health_body(&state);
    body["features"] = json!({
        "weatherAPI": state.config.weather.api_key.is_some(),
        "defaultLocation": state.config.weather.default_location,
        "temperatureUnit": state.config.weather.temperature_unit,
    });
    body["endpoints"] = json!({
        "rest": "/api",
        "mcp": "/mcp",
        "health": "/api/health",
    });
    Json(body)
}

fn health_body(state: &AppState) -> Value {
    json!({
        "status": "healthy",
        "timestamp": Utc::now(),
        "service": SERVER_NAME,
        "version": SERVER_VERSION,
        "uptime": state.uptime().as_secs_f64(),
        "environment": state.config.environment,
    })
}

fn location(query: &WeatherQuery) -> &str {
    query.city.as_deref().unwrap_or("default location")
}

/// Record → 200, empty → 404, provider failure → 500.
fn respond<T, F>(result: Result<Option<T>, WeatherError>, not_found: F, failure: &str) -> Response
where
    T: Serialize,
    F: FnOnce() -> String,
{
    match result {
        Ok(Some(record)) => Json(record).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, Json(json!({ "error": not_found() }))).into_response(),
        Err(e) => {
            error!(error = %e, "{failure}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("{failure}: {e}") })),
            )
                .into_response()
        }
    }
}
