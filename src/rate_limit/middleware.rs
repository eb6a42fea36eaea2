use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use super::limiter::{Admission, RateLimiter};

/// Key used when the peer address is not available (e.g. in-process tests).
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Derives the admission key for an HTTP request from its peer address.
pub fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Rejects requests over quota with `429 Too Many Requests` before they reach a handler.
pub async fn enforce_rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request);

    match limiter.check(&key) {
        Admission::Allowed => next.run(request).await,
        Admission::Denied { retry_after_secs } => {
            warn!(
                client = %key,
                path = %request.uri().path(),
                retry_after_secs,
                "Rate limited request"
            );
            too_many_requests(&limiter, retry_after_secs)
        }
    }
}

fn too_many_requests(limiter: &RateLimiter, retry_after_secs: u64) -> Response {
    let body = json!({
        "error": "Too many requests",
        "message": format!(
            "Rate limit exceeded. Max {} requests per {} seconds",
            limiter.max_requests(),
            limiter.window().as_secs()
        ),
        "retryAfter": retry_after_secs,
    });

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
    response
}
