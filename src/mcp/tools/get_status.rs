//! `get_status` MCP tool handler.
//!
//! Reports whether the server is running, the bound port, and the size of
//! the tool surface.

use serde_json::{json, Map, Value};

use crate::mcp::context::ToolContext;
use crate::mcp::registry::{tool_fn, ToolError, ToolFactory};
use crate::mcp::schema::{InputSchema, ToolDescriptor};

/// Tool name.
pub const NAME: &str = "get_status";

/// Descriptor announced by `tools/list`.
#[must_use]
pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        NAME,
        "Get the MCP server status: running state, bound port, and registered tool count.",
        InputSchema::empty(),
    )
}

/// Factory registered for this tool.
#[must_use]
pub fn factory() -> ToolFactory {
    tool_fn(handle)
}

async fn handle(context: ToolContext, _arguments: Map<String, Value>) -> Result<Value, ToolError> {
    let status = context.status().await?;

    let mut response = json!({
        "status": if status.running { "running" } else { "stopped" },
        "server": status.server,
        "version": status.version,
        "port": status.port,
        "toolCount": status.tool_count,
        "scriptingAvailable": status.scripting_available,
    });
    if let (Some(custom), Value::Object(map)) = (status.custom, &mut response) {
        map.insert("custom".into(), Value::Object(custom));
    }

    Ok(response)
}
