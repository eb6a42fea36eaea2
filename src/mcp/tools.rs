//! Tool registry and invocation.
//!
//! The registry is the `WeatherTool` enum: declaration order in `ALL` is the
//! order `tools/list` reports, and `from_name` is the only lookup.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use super::models::ToolResult;
use crate::error::WeatherError;
use crate::weather::{WeatherProvider, DEFAULT_FORECAST_DAYS};

/// Name of the current-conditions tool
pub const GET_WEATHER: &str = "get_weather";
/// Name of the forecast tool
pub const GET_FORECAST: &str = "get_forecast";
/// Name of the default-location tool
pub const GET_LOCAL_WEATHER: &str = "get_local_weather";

/// Why a tool call produced no record.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(serde_json::Error),

    #[error("Could not fetch {kind} data for {location}")]
    NoData {
        kind: &'static str,
        location: String,
    },

    #[error(transparent)]
    Backend(#[from] WeatherError),

    #[error("Failed to encode result: {0}")]
    Encoding(serde_json::Error),
}

/// Immutable description of one tool, as listed by `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[derive(Debug, Default, Deserialize)]
struct CityArgs {
    #[serde(default)]
    city: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ForecastArgs {
    #[serde(default)]
    city: Option<String>,
    /// Any JSON number. Fractions truncate and values below 1 become 1; the
    /// provider applies the upper bound.
    #[serde(default)]
    days: Option<f64>,
}

impl ForecastArgs {
    fn days(&self) -> u32 {
        match self.days {
            Some(days) => days.trunc().clamp(1.0, u32::MAX as f64) as u32,
            None => DEFAULT_FORECAST_DAYS,
        }
    }
}

/// Every tool this server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherTool {
    GetWeather,
    GetForecast,
    GetLocalWeather,
}

impl WeatherTool {
    /// Registry contents in `tools/list` order.
    pub const ALL: [WeatherTool; 3] = [
        WeatherTool::GetWeather,
        WeatherTool::GetForecast,
        WeatherTool::GetLocalWeather,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::GetWeather => GET_WEATHER,
            Self::GetForecast => GET_FORECAST,
            Self::GetLocalWeather => GET_LOCAL_WEATHER,
        }
    }

    pub fn descriptor(self) -> ToolDescriptor {
        match self {
            Self::GetWeather => ToolDescriptor {
                name: GET_WEATHER,
                description: "Get current weather for a city",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "city": {
                            "type": "string",
                            "description": "City name (optional - uses DEFAULT_LOCATION if not provided)"
                        }
                    }
                }),
            },
            Self::GetForecast => ToolDescriptor {
                name: GET_FORECAST,
                description: "Get weather forecast for a city",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "city": {
                            "type": "string",
                            "description": "City name (optional - uses DEFAULT_LOCATION if not provided)"
                        },
                        "days": {
                            "type": "integer",
                            "description": "Number of days (1-10)",
                            "minimum": 1,
                            "maximum": 10,
                            "default": DEFAULT_FORECAST_DAYS
                        }
                    }
                }),
            },
            Self::GetLocalWeather => ToolDescriptor {
                name: GET_LOCAL_WEATHER,
                description: "Get current weather for your default location",
                input_schema: json!({
                    "type": "object",
                    "properties": {}
                }),
            },
        }
    }

    /// Runs the tool against `provider`.
    ///
    /// Empty provider results become `ToolError::NoData`; provider failures
    /// are passed through untouched. Nothing is retried.
    pub async fn invoke(
        self,
        provider: &dyn WeatherProvider,
        args: Value,
    ) -> Result<ToolResult, ToolError> {
        debug!(tool = self.name(), "invoking tool");

        let text = match self {
            Self::GetWeather => {
                let args: CityArgs = parse_args(args)?;
                let city = non_empty(args.city.as_deref());
                let record = provider
                    .current(city)
                    .await?
                    .ok_or_else(|| no_data("weather", city))?;
                encode(&record)?
            }
            Self::GetForecast => {
                let args: ForecastArgs = parse_args(args)?;
                let city = non_empty(args.city.as_deref());
                let days = args.days();
                let record = provider
                    .forecast(city, days)
                    .await?
                    .ok_or_else(|| no_data("forecast", city))?;
                encode(&record)?
            }
            Self::GetLocalWeather => {
                let record = provider
                    .current(None)
                    .await?
                    .ok_or_else(|| no_data("weather", None))?;
                encode(&record)?
            }
        };

        Ok(ToolResult::text(text))
    }
}

/// Descriptors for every registered tool, in declaration order.
pub fn list_tools() -> Vec<ToolDescriptor> {
    WeatherTool::ALL.iter().map(|t| t.descriptor()).collect()
}

/// Resolves `name` and runs the tool. Unknown names fail like any other invocation.
pub async fn invoke(
    provider: &dyn WeatherProvider,
    name: &str,
    args: Value,
) -> Result<ToolResult, ToolError> {
    let tool = WeatherTool::from_name(name).ok_or_else(|| ToolError::UnknownTool(name.into()))?;
    tool.invoke(provider, args).await
}

fn parse_args<T: serde::de::DeserializeOwned + Default>(args: Value) -> Result<T, ToolError> {
    match args {
        Value::Null => Ok(T::default()),
        other => serde_json::from_value(other).map_err(ToolError::InvalidArguments),
    }
}

fn non_empty(city: Option<&str>) -> Option<&str> {
    city.map(str::trim).filter(|c| !c.is_empty())
}

fn no_data(kind: &'static str, city: Option<&str>) -> ToolError {
    ToolError::NoData {
        kind,
        location: city.unwrap_or("default location").to_string(),
    }
}

fn encode<T: Serialize>(record: &T) -> Result<String, ToolError> {
    serde_json::to_string(record).map_err(ToolError::Encoding)
}
