//! MCP (Model Context Protocol) HTTP route handlers
//!
//! `POST /mcp` carries one JSON-RPC message per request. The envelope is
//! validated before dispatch; notifications are answered with an empty 200.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::validation::{validate_envelope, InvalidEnvelope};
use crate::rate_limit::enforce_rate_limit;
use crate::state::SharedState;

/// Creates routes for MCP-related operations, gated by the MCP admission controller
pub fn routes(state: &SharedState) -> Router<SharedState> {
    Router::new()
        .route("/mcp", post(handle_mcp))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.mcp_limiter),
            enforce_rate_limit,
        ))
}

/// Endpoint: POST /mcp
async fn handle_mcp(
    State(state): State<SharedState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let value = match body {
        Ok(Json(value)) => value,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            warn!(error = %rejection.body_text(), "MCP body over limit");
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({ "error": "Payload too large" })),
            )
                .into_response();
        }
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Unparseable MCP body");
            return bad_envelope(InvalidEnvelope {
                id: None,
                details: vec![rejection.body_text()],
            });
        }
    };

    let request = match validate_envelope(value) {
        Ok(request) => request,
        Err(invalid) => {
            debug!(details = ?invalid.details, "Rejected MCP envelope");
            return bad_envelope(invalid);
        }
    };

    match state.mcp.dispatch(request).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::OK.into_response(),
    }
}

fn bad_envelope(invalid: InvalidEnvelope) -> Response {
    (StatusCode::BAD_REQUEST, Json(invalid.into_response())).into_response()
}
