//! Routing module for the weather service

use axum::{
    extract::{DefaultBodyLimit, OriginalUri},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
};
use tracing::warn;

use crate::mcp::models::{SERVER_NAME, SERVER_VERSION};
use crate::mcp::WeatherTool;
use crate::state::SharedState;

/// Largest request body accepted on any route (10 MiB).
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

const SECURITY_HEADERS: [(&str, &str); 5] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    ("permissions-policy", "geolocation=(), microphone=(), camera=()"),
];

/// Creates and configures the application router with all routes and middleware
pub fn create_app_router(state: SharedState) -> Router {
    let mut router = Router::new()
        .route("/", get(index))
        .merge(crate::mcp::routes(&state))
        .nest("/api", crate::api::routes(&state))
        .nest("/monitoring", crate::monitoring::routes())
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    for (name, value) in SECURITY_HEADERS {
        router = router.layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ));
    }

    router
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::monitoring::record_request,
        ))
        .layer(cors_layer(state.config.allowed_origins.as_deref()))
        .with_state(state)
}

/// Permissive when no origins are configured; otherwise an explicit list with credentials.
fn cors_layer(allowed_origins: Option<&[String]>) -> CorsLayer {
    let Some(origins) = allowed_origins else {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    };

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true)
}

/// Endpoint: GET /
/// Service index
async fn index() -> impl IntoResponse {
    let tools: Vec<&str> = WeatherTool::ALL.iter().map(|t| t.name()).collect();
    Json(json!({
        "service": SERVER_NAME,
        "version": SERVER_VERSION,
        "endpoints": {
            "rest": "/api",
            "mcp": "/mcp",
            "health": "/api/health",
        },
        "documentation": {
            "rest": {
                "weather": "GET /api/weather?city=London",
                "forecast": "GET /api/forecast?city=London&days=3",
                "local": "GET /api/local",
            },
            "mcp": {
                "description": "POST /mcp with MCP protocol messages",
                "tools": tools,
            },
        },
    }))
}

async fn not_found(method: Method, OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not found",
            "message": format!("Route {method} {uri} not found"),
        })),
    )
}
