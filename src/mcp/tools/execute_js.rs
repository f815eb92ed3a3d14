//! `execute_js` MCP tool handler.
//!
//! Runs caller-supplied JavaScript on the page surface through the host's
//! script primitive and returns whatever the script evaluates to.

use serde_json::{Map, Value};
use tracing::debug;

use super::util::require_str;
use crate::mcp::context::ToolContext;
use crate::mcp::registry::{tool_fn, ToolError, ToolFactory};
use crate::mcp::schema::{InputSchema, PropertyKind, ToolDescriptor};

/// Tool name.
pub const NAME: &str = "execute_js";

/// Descriptor announced by `tools/list`.
#[must_use]
pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        NAME,
        "Execute JavaScript in the page and return its result.",
        InputSchema::empty().required(
            "code",
            PropertyKind::String,
            "JavaScript source to evaluate",
        ),
    )
}

/// Factory registered for this tool.
#[must_use]
pub fn factory() -> ToolFactory {
    tool_fn(handle)
}

async fn handle(context: ToolContext, arguments: Map<String, Value>) -> Result<Value, ToolError> {
    let code = require_str(&arguments, "code")?;
    debug!(bytes = code.len(), "execute_js");
    context.await_script(code).await
}
