//! Envelope validation applied before dispatch.
//!
//! Rejections become `-32700 Parse error` responses whose `data` lists every
//! problem found, so the dispatcher only ever sees well-formed requests.

use serde_json::{Map, Value};

use super::models::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId, JSONRPC_VERSION};

const ALLOWED_KEYS: [&str; 4] = ["jsonrpc", "id", "method", "params"];

/// A message that failed validation, with whatever id could be recovered.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidEnvelope {
    pub id: Option<RpcId>,
    pub details: Vec<String>,
}

impl InvalidEnvelope {
    fn new(details: Vec<String>) -> Self {
        Self { id: None, details }
    }

    pub fn into_response(self) -> JsonRpcResponse {
        JsonRpcResponse::error(self.id, JsonRpcError::parse_error(self.details))
    }
}

/// Parses one raw message and validates its envelope.
pub fn parse_message(raw: &str) -> Result<JsonRpcRequest, InvalidEnvelope> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| InvalidEnvelope::new(vec![e.to_string()]))?;
    validate_envelope(value)
}

/// Checks the JSON-RPC envelope shape and converts it into a request.
///
/// Top-level string fields are trimmed before checking.
pub fn validate_envelope(value: Value) -> Result<JsonRpcRequest, InvalidEnvelope> {
    let Value::Object(mut body) = value else {
        return Err(InvalidEnvelope::new(vec![
            "\"value\" must be of type object".to_string(),
        ]));
    };

    for field in body.values_mut() {
        if let Value::String(s) = field {
            let trimmed = s.trim();
            if trimmed.len() != s.len() {
                *s = trimmed.to_string();
            }
        }
    }

    let mut details = Vec::new();

    match body.get("jsonrpc") {
        None => details.push("\"jsonrpc\" is required".to_string()),
        Some(Value::String(v)) if v == JSONRPC_VERSION => {}
        Some(Value::String(_)) => details.push("\"jsonrpc\" must be [2.0]".to_string()),
        Some(_) => details.push("\"jsonrpc\" must be a string".to_string()),
    }

    let id = match body.get("id") {
        None => None,
        Some(Value::Number(n)) => Some(RpcId::Number(n.clone())),
        Some(Value::String(s)) => Some(RpcId::Str(s.clone())),
        Some(_) => {
            details.push("\"id\" must be one of [string, number]".to_string());
            None
        }
    };

    let method = match body.get("method") {
        None => {
            details.push("\"method\" is required".to_string());
            None
        }
        Some(Value::String(m)) if m.is_empty() => {
            details.push("\"method\" is not allowed to be empty".to_string());
            None
        }
        Some(Value::String(m)) => Some(m.clone()),
        Some(_) => {
            details.push("\"method\" must be a string".to_string());
            None
        }
    };

    let params = match body.remove("params") {
        None => None,
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            details.push("\"params\" must be of type object".to_string());
            None
        }
    };

    details.extend(unknown_keys(&body));

    match method {
        Some(method) if details.is_empty() => Ok(JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method,
            params,
        }),
        _ => Err(InvalidEnvelope { id, details }),
    }
}

fn unknown_keys(body: &Map<String, Value>) -> impl Iterator<Item = String> + '_ {
    body.keys()
        .filter(|k| !ALLOWED_KEYS.contains(&k.as_str()))
        .map(|k| format!("\"{k}\" is not allowed"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_minimal_request() {
        let req = validate_envelope(json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}))
            .unwrap();
        assert_eq!(req.method, "tools/list");
        assert_eq!(req.id, Some(RpcId::Number(1u64.into())));
        assert!(req.params.is_none());
    }

    #[test]
    fn accepts_notification_and_trims_method() {
        let req = validate_envelope(json!({
            "jsonrpc": "2.0",
            "method": "  notifications/initialized ",
            "params": {}
        }))
        .unwrap();
        assert!(req.is_notification());
        assert_eq!(req.method, "notifications/initialized");
    }

    #[test]
    fn rejects_wrong_version_and_keeps_id() {
        let err = validate_envelope(json!({"jsonrpc": "1.0", "id": "x", "method": "m"}))
            .unwrap_err();
        assert_eq!(err.id, Some(RpcId::Str("x".into())));
        assert_eq!(err.details, vec!["\"jsonrpc\" must be [2.0]"]);
    }

    #[test]
    fn collects_every_problem() {
        let err = validate_envelope(json!({
            "id": true,
            "method": 123,
            "params": [1, 2],
            "extra": "nope"
        }))
        .unwrap_err();

        assert!(err.id.is_none());
        assert_eq!(
            err.details,
            vec![
                "\"jsonrpc\" is required",
                "\"id\" must be one of [string, number]",
                "\"method\" must be a string",
                "\"params\" must be of type object",
                "\"extra\" is not allowed",
            ]
        );
    }

    #[test]
    fn rejects_blank_method() {
        for method in ["", "   "] {
            let err = validate_envelope(json!({"jsonrpc": "2.0", "id": 3, "method": method}))
                .unwrap_err();
            assert_eq!(err.id, Some(RpcId::Number(3u64.into())));
            assert_eq!(err.details, vec!["\"method\" is not allowed to be empty"]);
        }
    }

    #[test]
    fn rejects_non_object_bodies() {
        let err = validate_envelope(json!([1, 2, 3])).unwrap_err();
        assert_eq!(err.details, vec!["\"value\" must be of type object"]);
    }

    #[test]
    fn malformed_json_becomes_parse_error_response() {
        let err = parse_message("{not json").unwrap_err();
        let resp = err.into_response();
        assert_eq!(resp.id, None);
        assert_eq!(resp.error.unwrap().code, -32700);
    }
}
