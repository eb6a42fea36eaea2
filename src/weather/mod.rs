//! Weather data provider.
//!
//! - Records returned to callers and the upstream payloads they map from
//! - The `WeatherProvider` seam shared by the REST and MCP surfaces
//! - `WeatherService`, the WeatherAPI.com implementation

pub mod models;
pub mod service;

pub use models::{ForecastDay, WeatherData, WeatherForecast};
pub use service::{WeatherProvider, WeatherService, DEFAULT_FORECAST_DAYS, MAX_FORECAST_DAYS};
