use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use super::models::{ApiCurrentResponse, ApiForecastResponse, WeatherData, WeatherForecast};
use crate::config::WeatherConfig;
use crate::error::WeatherError;

/// Upper bound on forecast length accepted by the upstream API.
pub const MAX_FORECAST_DAYS: u32 = 10;
/// Forecast length used when the caller does not ask for one.
pub const DEFAULT_FORECAST_DAYS: u32 = 3;

/// Source of weather records consumed by both the REST and MCP surfaces.
///
/// `Ok(None)` means the lookup ran but produced nothing usable (unknown city,
/// upstream outage). `Err` is reserved for failures the caller should see
/// verbatim, such as a missing API key.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current conditions for `city`, or for the default location when `None`.
    async fn current(&self, city: Option<&str>) -> Result<Option<WeatherData>, WeatherError>;

    /// Forecast for `city` covering `days` days.
    async fn forecast(
        &self,
        city: Option<&str>,
        days: u32,
    ) -> Result<Option<WeatherForecast>, WeatherError>;

    /// Current conditions for the configured default location.
    async fn local(&self) -> Result<Option<WeatherData>, WeatherError>;
}

/// `WeatherProvider` backed by WeatherAPI.com.
#[derive(Debug, Clone)]
pub struct WeatherService {
    client: reqwest::Client,
    config: WeatherConfig,
}

impl WeatherService {
    pub fn new(config: WeatherConfig) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("weathernode/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    fn resolve<'a>(&'a self, city: Option<&'a str>) -> &'a str {
        city.map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(self.config.default_location.as_str())
    }

    fn api_key(&self) -> Result<&str, WeatherError> {
        self.config
            .api_key
            .as_deref()
            .ok_or(WeatherError::MissingApiKey)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.config.base_url, endpoint);
        let response = self.client.get(&url).query(query).send().await?;

        if !response.status().is_success() {
            return Err(WeatherError::Status(response.status()));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl WeatherProvider for WeatherService {
    async fn current(&self, city: Option<&str>) -> Result<Option<WeatherData>, WeatherError> {
        let key = self.api_key()?;
        let location = self.resolve(city);
        debug!(location, "fetching current weather");

        let query = [
            ("key", key.to_string()),
            ("q", location.to_string()),
            ("aqi", "no".to_string()),
        ];
        match self.get_json::<ApiCurrentResponse>("current.json", &query).await {
            Ok(data) => Ok(Some(WeatherData::from_api(
                data,
                self.config.temperature_unit,
            ))),
            Err(e) => {
                error!(location, error = %e, "Error fetching current weather");
                Ok(None)
            }
        }
    }

    async fn forecast(
        &self,
        city: Option<&str>,
        days: u32,
    ) -> Result<Option<WeatherForecast>, WeatherError> {
        let key = self.api_key()?;
        let location = self.resolve(city);
        let upstream_days = days.clamp(1, MAX_FORECAST_DAYS);
        debug!(location, days, upstream_days, "fetching weather forecast");

        let query = [
            ("key", key.to_string()),
            ("q", location.to_string()),
            ("days", upstream_days.to_string()),
            ("aqi", "no".to_string()),
            ("alerts", "no".to_string()),
        ];
        match self.get_json::<ApiForecastResponse>("forecast.json", &query).await {
            Ok(data) => Ok(Some(WeatherForecast::from_api(
                data,
                self.config.temperature_unit,
                days,
            ))),
            Err(e) => {
                error!(location, days, error = %e, "Error fetching weather forecast");
                Ok(None)
            }
        }
    }

    async fn local(&self) -> Result<Option<WeatherData>, WeatherError> {
        self.current(None).await
    }
}
