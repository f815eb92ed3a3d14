//! Integration tests for host hooks: custom tools, log overrides, log
//! observers, and custom status fields.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use mcpwebkit::mcp::context::LogOverrides;
use mcpwebkit::mcp::registry::tool_fn;
use mcpwebkit::mcp::schema::{InputSchema, PropertyKind, ToolDescriptor};
use mcpwebkit::mcp::tools::ToolError;
use mcpwebkit::McpServer;
use serde_json::{json, Map, Value};

use super::test_helpers::{call_tool, client, result_text, start, test_config};

fn greet_descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        "greet",
        "Greet someone by name",
        InputSchema::empty().required("name", PropertyKind::String, "Who to greet"),
    )
}

#[tokio::test]
async fn custom_tool_is_callable_over_http() {
    let factory = tool_fn(|context, arguments: Map<String, Value>| async move {
        let Some(name) = arguments.get("name").and_then(Value::as_str) else {
            return Err(ToolError::MissingParameter("name".into()));
        };
        context.log(format!("greeted {name}"));
        Ok(json!(format!("hello, {name}")))
    });
    let (server, base) =
        start(McpServer::builder(test_config()).tool(greet_descriptor(), factory)).await;

    let result = call_tool(&base, "greet", json!({ "name": "ada" })).await;
    assert_eq!(result["isError"], false);
    assert_eq!(result_text(&result), "hello, ada");

    let missing = call_tool(&base, "greet", json!({})).await;
    assert_eq!(result_text(&missing), "missing parameter name");

    let logs = server.dispatcher().read_logs(None).await.expect("logs");
    assert!(logs.iter().any(|line| line.ends_with("greeted ada")));
}

#[tokio::test]
async fn tool_registered_after_start_is_listed() {
    let (server, base) = start(McpServer::builder(test_config())).await;
    server
        .register_tool(
            greet_descriptor(),
            tool_fn(|_context, _arguments| async { Ok(json!("hi")) }),
        )
        .expect("register");

    let result = call_tool(&base, "greet", json!({ "name": "x" })).await;
    assert_eq!(result_text(&result), "hi");
}

#[tokio::test]
async fn read_and_clear_overrides_replace_the_buffer() {
    let cleared = Arc::new(AtomicUsize::new(0));
    let clear_count = Arc::clone(&cleared);
    let overrides = LogOverrides {
        read: Some(Arc::new(|| vec!["external 1".to_owned(), "external 2".to_owned()])),
        clear: Some(Arc::new(move || {
            clear_count.fetch_add(1, Ordering::SeqCst);
        })),
        write: None,
    };
    let (_server, base) = start(McpServer::builder(test_config()).log_overrides(overrides)).await;

    let logs = call_tool(&base, "get_logs", json!({})).await;
    assert_eq!(
        serde_json::from_str::<Value>(result_text(&logs)).expect("json"),
        json!({ "count": 2, "logs": ["external 1", "external 2"] })
    );

    let limited = call_tool(&base, "get_logs", json!({ "limit": 1 })).await;
    assert_eq!(
        serde_json::from_str::<Value>(result_text(&limited)).expect("json")["logs"],
        json!(["external 2"])
    );

    let clear = call_tool(&base, "clear_logs", json!({})).await;
    assert_eq!(result_text(&clear), r#"{"cleared":true}"#);
    assert_eq!(cleared.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn write_override_and_observer_see_every_message() {
    let written: Arc<Mutex<Vec<String>>> = Arc::default();
    let observed: Arc<Mutex<Vec<String>>> = Arc::default();
    let write_sink = Arc::clone(&written);
    let observe_sink = Arc::clone(&observed);

    let overrides = LogOverrides {
        write: Some(Arc::new(move |message: &str| {
            write_sink.lock().unwrap().push(message.to_owned());
        })),
        ..LogOverrides::default()
    };
    let server = McpServer::builder(test_config())
        .log_overrides(overrides)
        .on_log(Arc::new(move |line: &str| {
            observe_sink.lock().unwrap().push(line.to_owned());
        }))
        .build();

    server.log("from host");
    // Round-trip through the dispatcher so the log command has been handled.
    let buffered = server.dispatcher().read_logs(None).await.expect("logs");
    assert!(buffered.is_empty());

    assert_eq!(*written.lock().unwrap(), ["from host"]);
    let observed = observed.lock().unwrap();
    assert_eq!(observed.len(), 1);
    assert!(observed[0].starts_with('['));
    assert!(observed[0].ends_with("] from host"));
}

#[tokio::test]
async fn custom_status_fields_are_merged() {
    let (_server, base) = start(McpServer::builder(test_config()).custom_status(Arc::new(|| {
        let mut fields = Map::new();
        fields.insert("pageUrl".into(), json!("about:blank"));
        fields
    })))
    .await;

    let status: Value = client()
        .get(format!("{base}/status"))
        .send()
        .await
        .expect("GET /status")
        .json()
        .await
        .expect("json");
    assert_eq!(status["custom"], json!({ "pageUrl": "about:blank" }));

    let result = call_tool(&base, "get_status", json!({})).await;
    let tool_status: Value = serde_json::from_str(result_text(&result)).expect("json");
    assert_eq!(tool_status["custom"]["pageUrl"], "about:blank");
}
