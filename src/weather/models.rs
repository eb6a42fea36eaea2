//! Weather records returned to callers and the upstream payloads they are
//! mapped from.
//!
//! Field declaration order is the serialization order, and tool results
//! embed these records as JSON text, so reordering fields is a wire change.

use serde::{Deserialize, Serialize};

use crate::config::TemperatureUnit;

// =============================================================================
// Records exposed to callers
// =============================================================================

/// Current conditions for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    pub city: String,
    pub country: String,
    pub temperature: f64,
    pub temperature_unit: TemperatureUnit,
    pub feels_like: f64,
    pub description: String,
    pub humidity: f64,
    /// Millibars.
    pub pressure: f64,
    /// Kilometres per hour.
    pub wind_speed: f64,
}

/// One day of a forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: String,
    pub min_temp: f64,
    pub max_temp: f64,
    pub description: String,
}

/// Multi-day forecast for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherForecast {
    pub city: String,
    pub country: String,
    pub temperature_unit: TemperatureUnit,
    /// Echoes what the caller asked for, before clamping.
    pub days_requested: u32,
    pub forecast: Vec<ForecastDay>,
}

// =============================================================================
// WeatherAPI.com payloads
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiLocation {
    pub name: String,
    pub country: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiCondition {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiCurrent {
    pub temp_c: f64,
    pub temp_f: f64,
    pub feelslike_c: f64,
    pub feelslike_f: f64,
    pub condition: ApiCondition,
    pub humidity: f64,
    pub pressure_mb: f64,
    pub wind_kph: f64,
}

/// Body of `GET /current.json`.
#[derive(Debug, Deserialize)]
pub struct ApiCurrentResponse {
    pub location: ApiLocation,
    pub current: ApiCurrent,
}

#[derive(Debug, Deserialize)]
pub struct ApiDay {
    pub mintemp_c: f64,
    pub maxtemp_c: f64,
    pub mintemp_f: f64,
    pub maxtemp_f: f64,
    pub condition: ApiCondition,
}

#[derive(Debug, Deserialize)]
pub struct ApiForecastDay {
    pub date: String,
    pub day: ApiDay,
}

#[derive(Debug, Deserialize)]
pub struct ApiForecast {
    pub forecastday: Vec<ApiForecastDay>,
}

/// Body of `GET /forecast.json`.
#[derive(Debug, Deserialize)]
pub struct ApiForecastResponse {
    pub location: ApiLocation,
    pub forecast: ApiForecast,
}

// =============================================================================
// Mapping
// =============================================================================

impl WeatherData {
    pub fn from_api(data: ApiCurrentResponse, unit: TemperatureUnit) -> Self {
        let celsius = unit == TemperatureUnit::Celsius;
        Self {
            city: data.location.name,
            country: data.location.country,
            temperature: if celsius { data.current.temp_c } else { data.current.temp_f },
            temperature_unit: unit,
            feels_like: if celsius {
                data.current.feelslike_c
            } else {
                data.current.feelslike_f
            },
            description: data.current.condition.text,
            humidity: data.current.humidity,
            pressure: data.current.pressure_mb,
            wind_speed: data.current.wind_kph,
        }
    }
}

impl WeatherForecast {
    pub fn from_api(data: ApiForecastResponse, unit: TemperatureUnit, days_requested: u32) -> Self {
        let celsius = unit == TemperatureUnit::Celsius;
        let forecast = data
            .forecast
            .forecastday
            .into_iter()
            .map(|d| ForecastDay {
                date: d.date,
                min_temp: if celsius { d.day.mintemp_c } else { d.day.mintemp_f },
                max_temp: if celsius { d.day.maxtemp_c } else { d.day.maxtemp_f },
                description: d.day.condition.text,
            })
            .collect();

        Self {
            city: data.location.name,
            country: data.location.country,
            temperature_unit: unit,
            days_requested,
            forecast,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn current_payload() -> ApiCurrentResponse {
        serde_json::from_value(json!({
            "location": { "name": "London", "country": "United Kingdom", "region": "City of London" },
            "current": {
                "temp_c": 15.0, "temp_f": 59.0,
                "feelslike_c": 14.0, "feelslike_f": 57.2,
                "condition": { "text": "Partly cloudy", "code": 1003 },
                "humidity": 72, "pressure_mb": 1015.0, "wind_kph": 11.2
            }
        }))
        .unwrap()
    }

    #[test]
    fn maps_current_conditions_in_celsius() {
        let data = WeatherData::from_api(current_payload(), TemperatureUnit::Celsius);
        assert_eq!(data.city, "London");
        assert_eq!(data.temperature, 15.0);
        assert_eq!(data.feels_like, 14.0);
        assert_eq!(data.pressure, 1015.0);
        assert_eq!(data.wind_speed, 11.2);
    }

    #[test]
    fn maps_current_conditions_in_fahrenheit() {
        let data = WeatherData::from_api(current_payload(), TemperatureUnit::Fahrenheit);
        assert_eq!(data.temperature, 59.0);
        assert_eq!(data.feels_like, 57.2);
        assert_eq!(data.temperature_unit, TemperatureUnit::Fahrenheit);
    }

    #[test]
    fn serializes_in_declaration_order() {
        let data = WeatherData::from_api(current_payload(), TemperatureUnit::Celsius);
        let text = serde_json::to_string(&data).unwrap();
        let keys = [
            "\"city\"",
            "\"country\"",
            "\"temperature\"",
            "\"temperature_unit\"",
            "\"feels_like\"",
            "\"description\"",
            "\"humidity\"",
            "\"pressure\"",
            "\"wind_speed\"",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| text.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{text}");
        assert!(text.contains("\"temperature_unit\":\"C\""));
    }

    #[test]
    fn maps_forecast_days() {
        let payload: ApiForecastResponse = serde_json::from_value(json!({
            "location": { "name": "Paris", "country": "France" },
            "forecast": { "forecastday": [
                { "date": "2024-01-01", "day": {
                    "mintemp_c": 2.0, "maxtemp_c": 8.0, "mintemp_f": 35.6, "maxtemp_f": 46.4,
                    "condition": { "text": "Rain" } } },
                { "date": "2024-01-02", "day": {
                    "mintemp_c": 1.0, "maxtemp_c": 6.0, "mintemp_f": 33.8, "maxtemp_f": 42.8,
                    "condition": { "text": "Cloudy" } } }
            ] }
        }))
        .unwrap();

        let forecast = WeatherForecast::from_api(payload, TemperatureUnit::Celsius, 2);
        assert_eq!(forecast.city, "Paris");
        assert_eq!(forecast.days_requested, 2);
        assert_eq!(forecast.forecast.len(), 2);
        assert_eq!(forecast.forecast[0].max_temp, 8.0);
        assert_eq!(forecast.forecast[1].description, "Cloudy");
    }
}
