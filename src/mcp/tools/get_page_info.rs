//! `get_page_info` MCP tool handler.

use serde_json::{Map, Value};

use crate::mcp::context::ToolContext;
use crate::mcp::registry::{tool_fn, ToolError, ToolFactory};
use crate::mcp::schema::{InputSchema, ToolDescriptor};

/// Tool name.
pub const NAME: &str = "get_page_info";

const SCRIPT: &str = r"(() => ({
  title: document.title,
  url: window.location.href,
  readyState: document.readyState,
  viewport: { width: window.innerWidth, height: window.innerHeight },
  scroll: { x: window.scrollX, y: window.scrollY },
  elementCount: document.getElementsByTagName('*').length,
}))()";

/// Descriptor announced by `tools/list`.
#[must_use]
pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        NAME,
        "Get the page title, URL, ready state, viewport size, and scroll position.",
        InputSchema::empty(),
    )
}

/// Factory registered for this tool.
#[must_use]
pub fn factory() -> ToolFactory {
    tool_fn(handle)
}

async fn handle(context: ToolContext, _arguments: Map<String, Value>) -> Result<Value, ToolError> {
    context.await_script(SCRIPT).await
}
