//! JSON-RPC 2.0 envelopes, protocol error codes, and outbound sanitization.
//!
//! Protocol errors ([`RpcError`]) live here and only here. Tool failures are
//! a separate type ([`crate::mcp::tools::ToolError`]) that is always
//! rendered as a successful `result` carrying `isError: true`.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON-RPC version string carried on every response.
pub const JSONRPC_VERSION: &str = "2.0";

/// Invalid JSON or missing `method`.
pub const PARSE_ERROR: i64 = -32700;
/// Unknown method name.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Required routing parameter absent or malformed.
pub const INVALID_PARAMS: i64 = -32602;
/// Response could not be serialized.
pub const INTERNAL_ERROR: i64 = -32603;

/// Hard-coded body used when a response cannot be serialized at all.
pub const INTERNAL_ERROR_BODY: &str =
    r#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"Internal error"}}"#;

/// Protocol-level failure with a fixed numeric code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RpcError {
    /// JSON-RPC error code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
}

impl RpcError {
    /// `-32700 Parse error`.
    #[must_use]
    pub fn parse_error() -> Self {
        Self {
            code: PARSE_ERROR,
            message: "Parse error".into(),
        }
    }

    /// `-32601 Method not found: <method>`.
    #[must_use]
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: METHOD_NOT_FOUND,
            message: format!("Method not found: {method}"),
        }
    }

    /// `-32602` with a caller-supplied message.
    #[must_use]
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: INVALID_PARAMS,
            message: message.into(),
        }
    }
}

impl Display for RpcError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

impl std::error::Error for RpcError {}

/// Parsed inbound request.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcRequest {
    /// Request id; absent for notifications.
    #[serde(default, deserialize_with = "deserialize_present")]
    pub id: Option<Value>,
    /// Method name.
    pub method: String,
    /// Method parameters.
    #[serde(default)]
    pub params: Option<Value>,
}

/// Keeps an explicit `"id": null` as `Some(Value::Null)` so it is echoed back.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl RpcRequest {
    /// Parse a request body.
    ///
    /// On failure the error carries whatever `id` could still be recovered
    /// from the raw JSON so the parse-error response can echo it.
    ///
    /// # Errors
    ///
    /// Returns the recovered id (if any) when the body is not a JSON object
    /// with a string `method`.
    pub fn parse(body: &[u8]) -> Result<Self, Option<Value>> {
        let value: Value = serde_json::from_slice(body).map_err(|_| None)?;
        let recovered_id = value.as_object().and_then(|obj| obj.get("id").cloned());
        serde_json::from_value(value).map_err(|_| recovered_id)
    }

    /// Object-valued `params`, or an empty map.
    #[must_use]
    pub fn params_object(&self) -> Map<String, Value> {
        match &self.params {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        }
    }
}

/// Outbound response envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcResponse {
    /// Always `"2.0"`.
    pub jsonrpc: &'static str,
    /// Echo of the request id; omitted when the request had none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Success payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Protocol error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    /// Successful response.
    #[must_use]
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Protocol error response.
    #[must_use]
    pub fn failure(id: Option<Value>, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Serialize to bytes after sanitizing the whole envelope.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error if serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&sanitize(self)?)
    }
}

/// Convert any serializable value to a JSON tree with every non-finite
/// float replaced by `null`.
///
/// `serde_json`'s value serializer already maps `NaN` and `±inf` to
/// `Value::Null`; the follow-up walk guarantees the invariant for values
/// that arrive as pre-built [`Value`] trees as well.
///
/// # Errors
///
/// Returns the underlying `serde_json` error if `value` cannot be
/// represented as JSON (e.g. a map with non-string keys).
pub fn sanitize<T: Serialize + ?Sized>(value: &T) -> Result<Value, serde_json::Error> {
    let mut tree = serde_json::to_value(value)?;
    replace_non_finite(&mut tree);
    Ok(tree)
}

fn replace_non_finite(value: &mut Value) {
    match value {
        Value::Number(number) => {
            if number.as_f64().is_some_and(|f| !f.is_finite()) {
                *value = Value::Null;
            }
        }
        Value::Array(items) => items.iter_mut().for_each(replace_non_finite),
        Value::Object(map) => map.values_mut().for_each(replace_non_finite),
        Value::Null | Value::Bool(_) | Value::String(_) => {}
    }
}

/// JSON value for an `f64`, `null` when not finite.
#[must_use]
pub fn finite_or_null(value: f64) -> Value {
    serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
}
