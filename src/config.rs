use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com/v1";
const DEFAULT_LOCATION: &str = "London";
const DEFAULT_WEATHER_TIMEOUT_SECS: u64 = 10;
/// REST surface: 100 requests per 15 minutes.
const DEFAULT_API_WINDOW_SECS: u64 = 15 * 60;
const DEFAULT_API_MAX: u32 = 100;
/// MCP surface: 50 requests per 15 minutes.
const DEFAULT_MCP_WINDOW_SECS: u64 = 15 * 60;
const DEFAULT_MCP_MAX: u32 = 50;
const DEFAULT_REQUEST_LOG_CAPACITY: usize = 1000;

/// Unit used for every temperature the provider reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[serde(rename = "C")]
    Celsius,
    #[serde(rename = "F")]
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "C" => Ok(Self::Celsius),
            "F" => Ok(Self::Fahrenheit),
            _ => Err(ConfigError::InvalidTemperatureUnit(raw.to_string())),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "C",
            Self::Fahrenheit => "F",
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Window and quota for one admission controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u32,
}

/// Settings for the upstream weather provider.
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_location: String,
    pub temperature_unit: TemperatureUnit,
    pub timeout: Duration,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_location: DEFAULT_LOCATION.to_string(),
            temperature_unit: TemperatureUnit::Celsius,
            timeout: Duration::from_secs(DEFAULT_WEATHER_TIMEOUT_SECS),
        }
    }
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub weather: WeatherConfig,
    /// `None` allows any origin.
    pub allowed_origins: Option<Vec<String>>,
    pub api_rate_limit: RateLimitConfig,
    pub mcp_rate_limit: RateLimitConfig,
    pub request_log_capacity: usize,
    pub environment: String,
    /// Filter directive used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            weather: WeatherConfig::default(),
            allowed_origins: None,
            api_rate_limit: RateLimitConfig {
                window: Duration::from_secs(DEFAULT_API_WINDOW_SECS),
                max_requests: DEFAULT_API_MAX,
            },
            mcp_rate_limit: RateLimitConfig {
                window: Duration::from_secs(DEFAULT_MCP_WINDOW_SECS),
                max_requests: DEFAULT_MCP_MAX,
            },
            request_log_capacity: DEFAULT_REQUEST_LOG_CAPACITY,
            environment: "development".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// - `PORT` (default 3000)
    /// - `WEATHER_API_KEY` (optional; tool calls fail without it)
    /// - `WEATHER_API_BASE_URL`, `DEFAULT_LOCATION`, `TEMP_UNIT`, `WEATHER_TIMEOUT_SECS`
    /// - `ALLOWED_ORIGINS` (comma separated)
    /// - `API_RATE_LIMIT_WINDOW_SECS`, `API_RATE_LIMIT_MAX`
    /// - `MCP_RATE_LIMIT_WINDOW_SECS`, `MCP_RATE_LIMIT_MAX`
    /// - `REQUEST_LOG_CAPACITY`, `APP_ENV`, `LOG_LEVEL`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), with a `.env` file found in the current
    /// directory or any parent filling in unset variables.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv_iter() {
            Ok(iter) => Self::with_file_fallback(iter.filter_map(Result::ok).collect()),
            Err(_) => Self::from_env(),
        }
    }

    /// Reads the process environment, falling back to the entries of the given
    /// dotenv file. A missing file is treated as empty.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match dotenvy::from_path_iter(path) {
            Ok(iter) => Self::with_file_fallback(iter.filter_map(Result::ok).collect()),
            Err(_) => Self::from_env(),
        }
    }

    fn with_file_fallback(file: HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| file.get(key).cloned()))
    }

    /// Build configuration from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let temperature_unit = match get("TEMP_UNIT") {
            Some(raw) => TemperatureUnit::parse(&raw)?,
            None => defaults.weather.temperature_unit,
        };

        let weather = WeatherConfig {
            api_key: get("WEATHER_API_KEY"),
            base_url: get("WEATHER_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.weather.base_url),
            default_location: get("DEFAULT_LOCATION").unwrap_or(defaults.weather.default_location),
            temperature_unit,
            timeout: Duration::from_secs(parse_int(
                &get,
                "WEATHER_TIMEOUT_SECS",
                DEFAULT_WEATHER_TIMEOUT_SECS,
            )?),
        };

        let allowed_origins = get("ALLOWED_ORIGINS").map(|raw| {
            raw.split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect()
        });

        Ok(Self {
            port: parse_int(&get, "PORT", DEFAULT_PORT)?,
            weather,
            allowed_origins,
            api_rate_limit: RateLimitConfig {
                window: Duration::from_secs(parse_int(
                    &get,
                    "API_RATE_LIMIT_WINDOW_SECS",
                    DEFAULT_API_WINDOW_SECS,
                )?),
                max_requests: parse_int(&get, "API_RATE_LIMIT_MAX", DEFAULT_API_MAX)?,
            },
            mcp_rate_limit: RateLimitConfig {
                window: Duration::from_secs(parse_int(
                    &get,
                    "MCP_RATE_LIMIT_WINDOW_SECS",
                    DEFAULT_MCP_WINDOW_SECS,
                )?),
                max_requests: parse_int(&get, "MCP_RATE_LIMIT_MAX", DEFAULT_MCP_MAX)?,
            },
            request_log_capacity: parse_int(
                &get,
                "REQUEST_LOG_CAPACITY",
                DEFAULT_REQUEST_LOG_CAPACITY,
            )?,
            environment: get("APP_ENV").unwrap_or(defaults.environment),
            log_level: get("LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

/// Parses a strictly positive integer, falling back to `default` when unset.
fn parse_int<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(v) if v > T::default() => Ok(v),
            _ => Err(ConfigError::InvalidInteger { name, value: raw }),
        },
    }
}
