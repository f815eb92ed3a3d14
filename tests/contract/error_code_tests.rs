//! Contract tests for protocol-level error codes.

use serde_json::{json, Value};

use super::test_helpers::{plain_server, rpc, rpc_raw};

#[tokio::test]
async fn unparsable_body_is_parse_error_without_id() {
    let server = plain_server();
    let response = rpc_raw(&server, b"{not json").await;
    assert_eq!(
        response,
        json!({ "jsonrpc": "2.0", "error": { "code": -32700, "message": "Parse error" } })
    );
}

#[tokio::test]
async fn missing_method_is_parse_error_with_recovered_id() {
    let server = plain_server();
    let response = rpc_raw(&server, br#"{"jsonrpc":"2.0","id":42}"#).await;
    assert_eq!(response["id"], 42);
    assert_eq!(response["error"]["code"], -32700);
}

#[tokio::test]
async fn unknown_method_is_method_not_found() {
    let server = plain_server();
    let response = rpc(&server, "resources/list", json!({})).await;
    assert_eq!(response["id"], 1);
    assert_eq!(
        response["error"],
        json!({ "code": -32601, "message": "Method not found: resources/list" })
    );
    assert!(response.get("result").is_none());
}

#[tokio::test]
async fn tools_call_without_name_is_invalid_params() {
    let server = plain_server();
    for params in [json!({}), json!({ "name": 7 }), Value::Null] {
        let response = rpc(&server, "tools/call", params).await;
        assert_eq!(
            response["error"],
            json!({ "code": -32602, "message": "Missing tool name" })
        );
    }
}

#[tokio::test]
async fn protocol_errors_never_carry_tool_content() {
    let server = plain_server();
    let response = rpc(&server, "nope", json!({})).await;
    assert!(response.get("result").is_none());
    assert!(response["error"]["code"].is_i64());
}
