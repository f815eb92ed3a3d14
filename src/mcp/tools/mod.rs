//! Built-in MCP tool handlers.
//!
//! Each module exposes a `descriptor()` and a `factory()`; [`builtins`]
//! lists them in the order they are announced by `tools/list`.

pub mod click_element;
pub mod execute_js;
pub mod get_page_info;
pub mod get_status;
pub mod logs;
pub mod query_selector;
pub mod util;

pub use crate::mcp::registry::ToolError;

use crate::mcp::registry::{ToolFactory, ToolRegistry};
use crate::mcp::schema::ToolDescriptor;

/// Built-in tools in announcement order.
#[must_use]
pub fn builtins() -> Vec<(ToolDescriptor, ToolFactory)> {
    vec![
        (get_status::descriptor(), get_status::factory()),
        (logs::get_logs_descriptor(), logs::get_logs_factory()),
        (logs::clear_logs_descriptor(), logs::clear_logs_factory()),
        (execute_js::descriptor(), execute_js::factory()),
        (query_selector::descriptor(), query_selector::factory()),
        (click_element::descriptor(), click_element::factory()),
        (get_page_info::descriptor(), get_page_info::factory()),
    ]
}

/// Register every built-in tool into `registry`.
pub fn register_builtins(registry: &mut ToolRegistry) {
    for (descriptor, factory) in builtins() {
        registry.register(descriptor, factory);
    }
}
