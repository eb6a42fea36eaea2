//! Shared fixtures for the integration suites.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

use weathernode::config::{AppConfig, TemperatureUnit};
use weathernode::error::WeatherError;
use weathernode::router::create_app_router;
use weathernode::state::AppState;
use weathernode::weather::{ForecastDay, WeatherData, WeatherForecast, WeatherProvider};

/// What the stub provider does on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Data,
    Empty,
    Fail,
}

/// In-memory provider that records every call.
pub struct StubProvider {
    pub mode: Mode,
    pub calls: Mutex<Vec<String>>,
}

impl StubProvider {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn answer<T>(&self, record: impl FnOnce() -> T) -> Result<Option<T>, WeatherError> {
        match self.mode {
            Mode::Data => Ok(Some(record())),
            Mode::Empty => Ok(None),
            Mode::Fail => Err(WeatherError::MissingApiKey),
        }
    }
}

pub fn weather_for(city: &str) -> WeatherData {
    WeatherData {
        city: city.to_string(),
        country: "United Kingdom".to_string(),
        temperature: 15.0,
        temperature_unit: TemperatureUnit::Celsius,
        feels_like: 14.0,
        description: "Partly cloudy".to_string(),
        humidity: 72.0,
        pressure: 1012.0,
        wind_speed: 11.2,
    }
}

#[async_trait]
impl WeatherProvider for StubProvider {
    async fn current(&self, city: Option<&str>) -> Result<Option<WeatherData>, WeatherError> {
        self.calls.lock().push(format!("current({city:?})"));
        self.answer(|| weather_for(city.unwrap_or("London")))
    }

    async fn forecast(
        &self,
        city: Option<&str>,
        days: u32,
    ) -> Result<Option<WeatherForecast>, WeatherError> {
        self.calls.lock().push(format!("forecast({city:?}, {days})"));
        self.answer(|| WeatherForecast {
            city: city.unwrap_or("London").to_string(),
            country: "United Kingdom".to_string(),
            temperature_unit: TemperatureUnit::Celsius,
            days_requested: days,
            forecast: (1..=days)
                .map(|d| ForecastDay {
                    date: format!("2024-06-{d:02}"),
                    min_temp: 10.0,
                    max_temp: 20.0,
                    description: "Sunny".to_string(),
                })
                .collect(),
        })
    }

    async fn local(&self) -> Result<Option<WeatherData>, WeatherError> {
        self.calls.lock().push("local".to_string());
        self.answer(|| weather_for("London"))
    }
}

/// Helper function to create a test app instance backed by a stub provider
pub fn create_test_app(mode: Mode) -> axum::Router {
    create_test_app_with(AppConfig::default(), Arc::new(StubProvider::new(mode)))
}

pub fn create_test_app_with(config: AppConfig, provider: Arc<StubProvider>) -> axum::Router {
    let state = Arc::new(AppState::with_provider(config, provider));
    create_app_router(state)
}

/// Sends a raw request and returns status, headers and the body parsed as JSON
/// (`Value::Null` when the body is empty or not JSON).
pub async fn send(
    app: &axum::Router,
    request: Request<Body>,
) -> (StatusCode, axum::http::HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    (status, headers, body)
}

/// Helper function to send a GET request and get the JSON response (REST API)
pub async fn get(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(app, request).await;
    (status, body)
}

/// Helper function to POST a raw body to `/mcp`
pub async fn post_mcp_raw(app: &axum::Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    let (status, _, body) = send(app, request).await;
    (status, body)
}

/// Helper function to send a JSON-RPC request and get the response
pub async fn send_jsonrpc_request(
    app: &axum::Router,
    method: &str,
    params: Option<Value>,
    id: i32,
) -> (StatusCode, Value) {
    let mut request_body = json!({
        "jsonrpc": "2.0",
        "method": method,
        "id": id
    });
    if let Some(params) = params {
        request_body["params"] = params;
    }

    post_mcp_raw(app, serde_json::to_string(&request_body).unwrap()).await
}
