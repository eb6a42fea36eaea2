//! Integration tests for the REST surface under `/api`

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use common::{create_test_app, create_test_app_with, get, Mode, StubProvider};
use weathernode::config::AppConfig;

#[tokio::test]
async fn test_weather_returns_record() {
    let app = create_test_app(Mode::Data);
    let (status, body) = get(&app, "/api/weather?city=Paris").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["city"], "Paris");
    assert_eq!(body["temperature_unit"], "C");
    assert_eq!(body["temperature"].as_f64(), Some(15.0));
}

#[tokio::test]
async fn test_weather_query_is_trimmed() {
    let provider = Arc::new(StubProvider::new(Mode::Data));
    let app = create_test_app_with(AppConfig::default(), Arc::clone(&provider));

    let (status, _) = get(&app, "/api/weather?city=%20%20Oslo%20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(*provider.calls.lock(), vec!["current(Some(\"Oslo\"))"]);
}

#[tokio::test]
async fn test_weather_not_found() {
    let app = create_test_app(Mode::Empty);

    let (status, body) = get(&app, "/api/weather?city=Atlantis").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Could not fetch weather data for Atlantis" }));

    let (status, body) = get(&app, "/api/weather").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["error"],
        "Could not fetch weather data for default location"
    );
}

#[tokio::test]
async fn test_weather_provider_failure() {
    let app = create_test_app(Mode::Fail);
    let (status, body) = get(&app, "/api/weather?city=London").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "Failed to fetch weather: WEATHER_API_KEY environment variable not set"
    );
}

#[tokio::test]
async fn test_forecast_defaults_and_explicit_days() {
    let provider = Arc::new(StubProvider::new(Mode::Data));
    let app = create_test_app_with(AppConfig::default(), Arc::clone(&provider));

    let (status, body) = get(&app, "/api/forecast?city=London").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["days_requested"], 3);

    let (status, body) = get(&app, "/api/forecast?days=7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["forecast"].as_array().unwrap().len(), 7);

    assert_eq!(
        *provider.calls.lock(),
        vec!["forecast(Some(\"London\"), 3)", "forecast(None, 7)"]
    );
}

#[tokio::test]
async fn test_forecast_errors() {
    let app = create_test_app(Mode::Empty);
    let (status, body) = get(&app, "/api/forecast?city=Nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Could not fetch forecast data for Nowhere");

    let app = create_test_app(Mode::Fail);
    let (status, body) = get(&app, "/api/forecast").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to fetch forecast: "));
}

#[tokio::test]
async fn test_local_weather() {
    let provider = Arc::new(StubProvider::new(Mode::Data));
    let app = create_test_app_with(AppConfig::default(), Arc::clone(&provider));
    let (status, body) = get(&app, "/api/local").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["city"], "London");
    assert_eq!(*provider.calls.lock(), vec!["local"]);

    let app = create_test_app(Mode::Fail);
    let (status, body) = get(&app, "/api/local").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to fetch local weather: "));
}

#[tokio::test]
async fn test_invalid_query_parameters() {
    let provider = Arc::new(StubProvider::new(Mode::Data));
    let app = create_test_app_with(AppConfig::default(), Arc::clone(&provider));

    let (status, body) = get(&app, "/api/forecast?days=11").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid query parameters");
    assert_eq!(
        body["details"],
        json!(["\"days\" must be less than or equal to 10"])
    );

    let (status, body) = get(&app, "/api/weather?city=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], json!(["\"city\" is not allowed to be empty"]));

    let (status, body) = get(&app, "/api/health?verbose=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], json!(["\"verbose\" is not allowed"]));

    assert!(provider.calls.lock().is_empty());
}

#[tokio::test]
async fn test_health() {
    let app = create_test_app(Mode::Data);
    let (status, body) = get(&app, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "weathernode");
    assert_eq!(body["environment"], "development");
    assert!(body["uptime"].as_f64().is_some());
    assert!(body["timestamp"].is_string());
    assert!(body.get("features").is_none());
}

#[tokio::test]
async fn test_health_detailed() {
    let mut config = AppConfig::default();
    config.weather.api_key = Some("secret".to_string());
    config.weather.default_location = "Berlin".to_string();
    let app = create_test_app_with(config, Arc::new(StubProvider::new(Mode::Data)));

    let (status, body) = get(&app, "/api/health/detailed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["features"],
        json!({
            "weatherAPI": true,
            "defaultLocation": "Berlin",
            "temperatureUnit": "C"
        })
    );
    assert_eq!(body["endpoints"]["mcp"], "/mcp");
    assert_eq!(body["status"], "healthy");
}
