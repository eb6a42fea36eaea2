//! REST surface mounted under `/api`.
//!
//! Every matched route passes the REST admission controller first, then
//! query validation.

pub mod handlers;
pub mod query;

use std::sync::Arc;

use axum::{middleware, Router};

use crate::rate_limit::enforce_rate_limit;
use crate::state::SharedState;

pub use query::{parse_weather_query, validate_weather_query, WeatherQuery};

/// `/api` routes with validation and rate limiting attached.
pub fn routes(state: &SharedState) -> Router<SharedState> {
    handlers::routes()
        .route_layer(middleware::from_fn(validate_weather_query))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.api_limiter),
            enforce_rate_limit,
        ))
}
