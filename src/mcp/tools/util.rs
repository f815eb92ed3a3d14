//! Shared utilities for MCP tool handlers.

use serde_json::{Map, Value};

use crate::mcp::registry::ToolError;

/// Fetch a required string argument.
///
/// # Errors
///
/// Returns `ToolError::MissingParameter` when absent or `null`, and
/// `ToolError::InvalidParameter` when present but not a string.
pub fn require_str<'a>(
    arguments: &'a Map<String, Value>,
    name: &str,
) -> Result<&'a str, ToolError> {
    match arguments.get(name) {
        None | Some(Value::Null) => Err(ToolError::MissingParameter(name.to_owned())),
        Some(Value::String(text)) => Ok(text),
        Some(_) => Err(ToolError::InvalidParameter {
            name: name.to_owned(),
            reason: "expected a string".into(),
        }),
    }
}

/// Fetch an optional boolean argument, defaulting to `false`.
///
/// # Errors
///
/// Returns `ToolError::InvalidParameter` when present but not a boolean.
pub fn optional_bool(arguments: &Map<String, Value>, name: &str) -> Result<bool, ToolError> {
    match arguments.get(name) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(_) => Err(ToolError::InvalidParameter {
            name: name.to_owned(),
            reason: "expected a boolean".into(),
        }),
    }
}

/// Fetch an optional non-negative integer argument.
///
/// # Errors
///
/// Returns `ToolError::InvalidParameter` when present but not a
/// non-negative integer.
pub fn optional_usize(
    arguments: &Map<String, Value>,
    name: &str,
) -> Result<Option<usize>, ToolError> {
    match arguments.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| ToolError::InvalidParameter {
                name: name.to_owned(),
                reason: "expected a non-negative integer".into(),
            }),
    }
}

/// Quote `text` as a JavaScript string literal.
///
/// JSON string syntax is valid JavaScript, apart from U+2028/U+2029 in
/// older engines, which are escaped explicitly.
#[must_use]
pub fn js_string(text: &str) -> String {
    Value::String(text.to_owned())
        .to_string()
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}
