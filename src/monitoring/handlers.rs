//! Monitoring route handlers and the request-logging middleware

use std::time::Instant;

use axum::{
    body::Body,
    extract::{Query, Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use super::request_log::LogEntry;
use crate::mcp::models::SERVER_VERSION;
use crate::rate_limit::client_key;
use crate::state::SharedState;

/// Header carrying the id assigned to each request.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const DEFAULT_LOG_LIMIT: usize = 100;
/// Logged copies of error bodies are cut to this many bytes.
const MAX_LOGGED_ERROR_BYTES: usize = 64 * 1024;

/// Creates routes mounted under `/monitoring`
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/logs", get(get_logs).delete(clear_logs))
        .route("/stats", get(get_stats))
        .route("/metrics", get(get_metrics))
}

#[derive(Debug, Deserialize)]
struct LogsQuery {
    limit: Option<String>,
}

/// Endpoint: GET /monitoring/logs?limit=N
/// A missing, non-numeric or zero limit falls back to 100.
async fn get_logs(
    State(state): State<SharedState>,
    Query(query): Query<LogsQuery>,
) -> impl IntoResponse {
    let limit = query
        .limit
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_LOG_LIMIT);

    let logs = state.request_log.recent(limit);
    Json(json!({
        "count": logs.len(),
        "logs": logs,
        "limit": limit,
    }))
}

/// Endpoint: DELETE /monitoring/logs
async fn clear_logs(State(state): State<SharedState>) -> impl IntoResponse {
    state.request_log.clear();
    info!("Request log cleared");
    Json(json!({ "message": "Logs cleared successfully" }))
}

/// Endpoint: GET /monitoring/stats
async fn get_stats(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.request_log.stats())
}

/// Endpoint: GET /monitoring/metrics
async fn get_metrics(State(state): State<SharedState>) -> impl IntoResponse {
    Json(json!({
        "timestamp": Utc::now(),
        "uptime": state.uptime().as_secs_f64(),
        "platform": std::env::consts::OS,
        "arch": std::env::consts::ARCH,
        "version": SERVER_VERSION,
        "environment": state.config.environment,
    }))
}

/// Records every request in the ring buffer and emits a `tracing` event for it.
///
/// Also tags the response with an `x-request-id` header.
pub async fn record_request(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let request_id = Uuid::new_v4();

    let method = request.method().to_string();
    let url = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let ip = client_key(&request);
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let response = next.run(request).await;
    let status = response.status();

    let (mut response, error) = if status.is_client_error() || status.is_server_error() {
        capture_error_body(response).await
    } else {
        (response, None)
    };

    let response_time = started.elapsed().as_millis() as u64;

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    if status.is_server_error() {
        warn!(%request_id, %method, %url, status = status.as_u16(), response_time, "request failed");
    } else {
        info!(%request_id, %method, %url, status = status.as_u16(), response_time, "request served");
    }

    state.request_log.push(LogEntry {
        request_id,
        timestamp: Utc::now(),
        method,
        url,
        ip,
        user_agent,
        status_code: status.as_u16(),
        response_time,
        error,
    });

    response
}

/// Buffers an error response so its body can be logged, then rebuilds it.
///
/// The client always receives the full body; only the logged copy is truncated.
async fn capture_error_body(response: Response) -> (Response, Option<String>) {
    let (parts, body) = response.into_parts();
    let reason = parts
        .status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string();

    match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => {
            let text = if bytes.is_empty() {
                reason
            } else {
                truncate_for_log(&bytes)
            };
            (Response::from_parts(parts, Body::from(bytes)), Some(text))
        }
        Err(e) => {
            warn!(error = %e, "Failed to buffer error response body");
            (Response::from_parts(parts, Body::empty()), Some(reason))
        }
    }
}

fn truncate_for_log(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    if text.len() <= MAX_LOGGED_ERROR_BYTES {
        return text.into_owned();
    }
    let mut end = MAX_LOGGED_ERROR_BYTES;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
