//! `get_logs` and `clear_logs` MCP tool handlers.

use serde_json::{json, Map, Value};

use super::util::optional_usize;
use crate::mcp::context::ToolContext;
use crate::mcp::registry::{tool_fn, ToolError, ToolFactory};
use crate::mcp::schema::{InputSchema, PropertyKind, ToolDescriptor};

/// `get_logs` tool name.
pub const GET_LOGS: &str = "get_logs";
/// `clear_logs` tool name.
pub const CLEAR_LOGS: &str = "clear_logs";

/// Descriptor for `get_logs`.
#[must_use]
pub fn get_logs_descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        GET_LOGS,
        "Get the server's buffered log lines, oldest first.",
        InputSchema::empty().optional(
            "limit",
            PropertyKind::Integer,
            "Return only the most recent N lines",
        ),
    )
}

/// Factory for `get_logs`.
#[must_use]
pub fn get_logs_factory() -> ToolFactory {
    tool_fn(get_logs)
}

/// Descriptor for `clear_logs`.
#[must_use]
pub fn clear_logs_descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        CLEAR_LOGS,
        "Clear the server's log buffer.",
        InputSchema::empty(),
    )
}

/// Factory for `clear_logs`.
#[must_use]
pub fn clear_logs_factory() -> ToolFactory {
    tool_fn(clear_logs)
}

async fn get_logs(context: ToolContext, arguments: Map<String, Value>) -> Result<Value, ToolError> {
    let limit = optional_usize(&arguments, "limit")?;
    let lines = context.logs(limit).await?;
    Ok(json!({ "count": lines.len(), "logs": lines }))
}

async fn clear_logs(
    context: ToolContext,
    _arguments: Map<String, Value>,
) -> Result<Value, ToolError> {
    let removed = context.clear_logs().await?;
    let mut response = json!({ "cleared": true });
    if let (Some(removed), Value::Object(map)) = (removed, &mut response) {
        map.insert("removed".into(), json!(removed));
    }
    Ok(response)
}
