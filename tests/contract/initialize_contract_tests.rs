//! Contract tests for the `initialize` handshake.

use mcpwebkit::mcp::{PROTOCOL_VERSION, SERVER_NAME, SERVER_VERSION};
use serde_json::json;

use super::test_helpers::{plain_server, rpc, rpc_raw};

#[tokio::test]
async fn initialize_returns_exact_result() {
    let server = plain_server();
    let response = rpc(&server, "initialize", json!({})).await;
    assert_eq!(
        response,
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "protocolVersion": "2025-03-26",
                "serverInfo": { "name": "mcpwebkit", "version": env!("CARGO_PKG_VERSION") },
                "capabilities": { "tools": {} },
            },
        })
    );
}

#[tokio::test]
async fn initialize_wire_bytes_are_ordered() {
    let server = plain_server();
    let body = br#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#;
    let response = server
        .dispatcher()
        .dispatch(body.to_vec(), Vec::new())
        .await
        .expect("dispatch");
    let text = String::from_utf8(response.to_bytes().expect("serialize")).expect("utf8");
    assert_eq!(
        text,
        format!(
            r#"{{"jsonrpc":"2.0","id":1,"result":{{"protocolVersion":"{PROTOCOL_VERSION}","serverInfo":{{"name":"{SERVER_NAME}","version":"{SERVER_VERSION}"}},"capabilities":{{"tools":{{}}}}}}}}"#
        )
    );
}

#[tokio::test]
async fn initialized_notification_gets_empty_result() {
    let server = plain_server();
    for method in ["initialized", "notifications/initialized"] {
        let response = rpc(&server, method, json!({})).await;
        assert_eq!(response["result"], json!({}), "{method}");
    }
}

#[tokio::test]
async fn request_without_id_gets_no_id() {
    let server = plain_server();
    let response = rpc_raw(&server, br#"{"jsonrpc":"2.0","method":"initialized"}"#).await;
    assert!(response.get("id").is_none());
    assert_eq!(response["result"], json!({}));
}

#[tokio::test]
async fn string_ids_are_echoed() {
    let server = plain_server();
    let response = rpc_raw(&server, br#"{"jsonrpc":"2.0","id":"abc","method":"tools/list"}"#).await;
    assert_eq!(response["id"], "abc");
}
