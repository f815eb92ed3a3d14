//! `query_selector` MCP tool handler.
//!
//! Describes the first element (or every element, with `all: true`) that
//! matches a CSS selector: tag, id, class, trimmed text, and attributes.

use serde_json::{Map, Value};

use super::util::{js_string, optional_bool, require_str};
use crate::mcp::context::ToolContext;
use crate::mcp::registry::{tool_fn, ToolError, ToolFactory};
use crate::mcp::schema::{InputSchema, PropertyKind, ToolDescriptor};

/// Tool name.
pub const NAME: &str = "query_selector";

const SCRIPT: &str = r"(() => {
  const describe = (el) => ({
    tagName: el.tagName.toLowerCase(),
    id: el.id || null,
    className: typeof el.className === 'string' && el.className ? el.className : null,
    text: (el.textContent || '').trim().slice(0, 200),
    attributes: Object.fromEntries(Array.from(el.attributes).map((a) => [a.name, a.value])),
  });
  const selector = __SELECTOR__;
  if (__ALL__) {
    const elements = Array.from(document.querySelectorAll(selector)).map(describe);
    return { selector, count: elements.length, elements };
  }
  const el = document.querySelector(selector);
  return { selector, found: el !== null, element: el ? describe(el) : null };
})()";

/// Descriptor announced by `tools/list`.
#[must_use]
pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        NAME,
        "Find elements matching a CSS selector and describe them.",
        InputSchema::empty()
            .required("selector", PropertyKind::String, "CSS selector to match")
            .optional(
                "all",
                PropertyKind::Boolean,
                "Return every match instead of only the first",
            ),
    )
}

/// Factory registered for this tool.
#[must_use]
pub fn factory() -> ToolFactory {
    tool_fn(handle)
}

/// Build the query script for `selector`.
#[must_use]
pub fn build_script(selector: &str, all: bool) -> String {
    SCRIPT
        .replace("__ALL__", if all { "true" } else { "false" })
        .replace("__SELECTOR__", &js_string(selector))
}

async fn handle(context: ToolContext, arguments: Map<String, Value>) -> Result<Value, ToolError> {
    let selector = require_str(&arguments, "selector")?;
    let all = optional_bool(&arguments, "all")?;
    context.await_script(build_script(selector, all)).await
}
