//! `click_element` MCP tool handler.

use serde_json::{json, Map, Value};

use super::util::{js_string, require_str};
use crate::mcp::context::ToolContext;
use crate::mcp::registry::{tool_fn, ToolError, ToolFactory};
use crate::mcp::schema::{InputSchema, PropertyKind, ToolDescriptor};

/// Tool name.
pub const NAME: &str = "click_element";

const SCRIPT: &str = r"(() => {
  const el = document.querySelector(__SELECTOR__);
  if (!el) {
    return { clicked: false };
  }
  if (typeof el.scrollIntoView === 'function') {
    el.scrollIntoView({ block: 'center' });
  }
  el.click();
  return { clicked: true, tagName: el.tagName.toLowerCase() };
})()";

/// Descriptor announced by `tools/list`.
#[must_use]
pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        NAME,
        "Click the first element matching a CSS selector.",
        InputSchema::empty().required(
            "selector",
            PropertyKind::String,
            "CSS selector of the element to click",
        ),
    )
}

/// Factory registered for this tool.
#[must_use]
pub fn factory() -> ToolFactory {
    tool_fn(handle)
}

async fn handle(context: ToolContext, arguments: Map<String, Value>) -> Result<Value, ToolError> {
    let selector = require_str(&arguments, "selector")?;
    let script = SCRIPT.replace("__SELECTOR__", &js_string(selector));
    let outcome = context.await_script(script).await?;

    if outcome.get("clicked").and_then(Value::as_bool) == Some(true) {
        let tag = outcome.get("tagName").cloned().unwrap_or(Value::Null);
        Ok(json!({ "clicked": true, "selector": selector, "tagName": tag }))
    } else {
        Err(ToolError::Execution(format!(
            "no element matches selector {selector}"
        )))
    }
}
