//! Query-string validation for the REST surface.

use axum::{
    extract::{Query, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::debug;

use crate::weather::MAX_FORECAST_DAYS;

const MAX_CITY_CHARS: usize = 100;

/// Validated `/api` query parameters, inserted as a request extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeatherQuery {
    pub city: Option<String>,
    pub days: Option<u32>,
}

/// Checks raw query pairs. Values are trimmed first; every problem is reported.
pub fn parse_weather_query(pairs: &[(String, String)]) -> Result<WeatherQuery, Vec<String>> {
    let mut query = WeatherQuery::default();
    let mut details = Vec::new();
    let mut seen_city = false;
    let mut seen_days = false;

    for (key, raw) in pairs {
        let value = raw.trim();
        match key.as_str() {
            "city" if seen_city => details.push("\"city\" must be a string".to_string()),
            "city" => {
                seen_city = true;
                if value.is_empty() {
                    details.push("\"city\" is not allowed to be empty".to_string());
                } else if value.chars().count() > MAX_CITY_CHARS {
                    details.push(format!(
                        "\"city\" length must be less than or equal to {MAX_CITY_CHARS} characters long"
                    ));
                } else {
                    query.city = Some(value.to_string());
                }
            }
            "days" if seen_days => details.push("\"days\" must be a number".to_string()),
            "days" => {
                seen_days = true;
                match parse_days(value) {
                    Ok(days) => query.days = Some(days),
                    Err(msg) => details.push(msg),
                }
            }
            other => details.push(format!("\"{other}\" is not allowed")),
        }
    }

    if details.is_empty() {
        Ok(query)
    } else {
        Err(details)
    }
}

fn parse_days(value: &str) -> Result<u32, String> {
    let number: f64 = value
        .parse()
        .ok()
        .filter(|n: &f64| n.is_finite())
        .ok_or_else(|| "\"days\" must be a number".to_string())?;

    if number.fract() != 0.0 {
        return Err("\"days\" must be an integer".to_string());
    }
    if number < 1.0 {
        return Err("\"days\" must be greater than or equal to 1".to_string());
    }
    if number > f64::from(MAX_FORECAST_DAYS) {
        return Err(format!(
            "\"days\" must be less than or equal to {MAX_FORECAST_DAYS}"
        ));
    }
    Ok(number as u32)
}

/// Rejects bad query strings with `400` before the handler runs.
pub async fn validate_weather_query(mut request: Request, next: Next) -> Response {
    let pairs = match Query::<Vec<(String, String)>>::try_from_uri(request.uri()) {
        Ok(Query(pairs)) => pairs,
        Err(e) => return invalid_query(vec![e.body_text()]),
    };

    match parse_weather_query(&pairs) {
        Ok(query) => {
            request.extensions_mut().insert(query);
            next.run(request).await
        }
        Err(details) => {
            debug!(?details, "Rejected query parameters");
            invalid_query(details)
        }
    }
}

fn invalid_query(details: Vec<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "Invalid query parameters",
            "details": details,
        })),
    )
        .into_response()
}
