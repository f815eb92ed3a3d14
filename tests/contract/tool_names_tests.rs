//! Contract tests for the tool names announced by `tools/list`.

use mcpwebkit::mcp::registry::tool_fn;
use mcpwebkit::mcp::schema::{InputSchema, ToolDescriptor};
use mcpwebkit::{McpServer, ServerConfig};
use serde_json::{json, Value};

use super::test_helpers::{call_tool, plain_server, result_text, rpc};

const BUILTIN_NAMES: [&str; 7] = [
    "get_status",
    "get_logs",
    "clear_logs",
    "execute_js",
    "query_selector",
    "click_element",
    "get_page_info",
];

fn listed_names(response: &Value) -> Vec<String> {
    response["result"]["tools"]
        .as_array()
        .expect("tools array")
        .iter()
        .map(|tool| tool["name"].as_str().expect("name").to_owned())
        .collect()
}

#[tokio::test]
async fn builtins_are_listed_in_order() {
    let server = plain_server();
    let response = rpc(&server, "tools/list", json!({})).await;
    assert_eq!(listed_names(&response), BUILTIN_NAMES);
}

#[tokio::test]
async fn custom_tools_follow_builtins() {
    let server = McpServer::builder(ServerConfig::default())
        .tool(
            ToolDescriptor::new("echo", "Echo arguments", InputSchema::empty()),
            tool_fn(|_context, arguments| async move { Ok(Value::Object(arguments)) }),
        )
        .build();

    let names = listed_names(&rpc(&server, "tools/list", json!({})).await);
    assert_eq!(names.len(), BUILTIN_NAMES.len() + 1);
    assert_eq!(names.last().map(String::as_str), Some("echo"));
}

#[tokio::test]
async fn runtime_reregistration_keeps_position_and_replaces_behaviour() {
    let server = plain_server();
    server
        .register_tool(
            ToolDescriptor::new("get_status", "Overridden status", InputSchema::empty()),
            tool_fn(|_context, _arguments| async { Ok(json!("overridden")) }),
        )
        .expect("register");

    let response = rpc(&server, "tools/list", json!({})).await;
    assert_eq!(listed_names(&response), BUILTIN_NAMES);
    assert_eq!(response["result"]["tools"][0]["description"], "Overridden status");

    let result = call_tool(&server, "get_status", json!({})).await;
    assert_eq!(result_text(&result), "overridden");
}
