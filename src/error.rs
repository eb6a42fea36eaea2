//! Error types shared across the service.
//!
//! Each layer owns one enum: configuration parsing, the upstream weather
//! provider, tool invocation and the stream transport.

use thiserror::Error;

/// Invalid or missing environment configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a positive integer (got {value:?})")]
    InvalidInteger { name: &'static str, value: String },

    #[error("TEMP_UNIT must be C or F (got {0:?})")]
    InvalidTemperatureUnit(String),
}

/// Failures raised by the weather provider.
///
/// Only configuration problems escape the provider as errors; upstream
/// outages are reported as an empty result (see `WeatherProvider`).
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("WEATHER_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Weather API returned status: {0}")]
    Status(reqwest::StatusCode),
}

/// Transport-level failures of the stream adapter.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Writer task failed: {0}")]
    Writer(#[from] tokio::task::JoinError),
}
