//! Integration tests for the non-MCP HTTP routes.
//!
//! Covers `GET /health`, `GET /status`, `GET /`, unknown routes, and
//! the raw wire format of responses.

use mcpwebkit::McpServer;
use serde_json::{json, Value};

use super::test_helpers::{client, raw_exchange, start, start_plain, test_config};

#[tokio::test]
async fn health_reports_ok_and_port() {
    let (server, base) = start_plain().await;
    let port = server.port().expect("running");

    let response = client()
        .get(format!("{base}/health"))
        .send()
        .await
        .expect("GET /health");
    assert_eq!(response.status(), 200);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );

    let body: Value = response.json().await.expect("json");
    assert_eq!(body, json!({ "status": "ok", "port": port }));
}

#[tokio::test]
async fn status_reports_running_snapshot() {
    let (server, base) = start_plain().await;
    let port = server.port().expect("running");

    let body: Value = client()
        .get(format!("{base}/status"))
        .send()
        .await
        .expect("GET /status")
        .json()
        .await
        .expect("json");

    assert_eq!(body["running"], true);
    assert_eq!(body["port"], port);
    assert_eq!(body["server"], "mcpwebkit");
    assert_eq!(body["toolCount"], 7);
    assert_eq!(body["scriptingAvailable"], false);
}

#[tokio::test]
async fn root_serves_html_status_page() {
    let (_server, base) = start_plain().await;
    let response = client().get(format!("{base}/")).send().await.expect("GET /");

    assert_eq!(response.status(), 200);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    assert!(content_type.starts_with("text/html"));
    assert!(response.text().await.expect("body").contains("mcpwebkit"));
}

#[tokio::test]
async fn unknown_route_is_404_and_closes() {
    let (server, _base) = start_plain().await;
    let port = server.port().expect("running");

    let text = raw_exchange(port, b"GET /nonexistent HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
    assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"), "{text}");
    assert!(text.contains("Content-Length: 9\r\n"));
    assert!(text.contains("Access-Control-Allow-Origin: *\r\n"));
    assert!(text.contains("Connection: close\r\n"));
    assert!(text.ends_with("\r\n\r\nNot Found"));
}

#[tokio::test]
async fn wrong_verb_on_known_path_is_404() {
    let (_server, base) = start_plain().await;
    let response = client()
        .post(format!("{base}/health"))
        .send()
        .await
        .expect("POST /health");
    assert_eq!(response.status(), 404);

    let response = client()
        .get(format!("{base}/mcp"))
        .send()
        .await
        .expect("GET /mcp");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn malformed_request_line_is_400() {
    let (server, _base) = start_plain().await;
    let port = server.port().expect("running");

    let text = raw_exchange(port, b"GARBAGE\r\n\r\n").await;
    assert!(text.starts_with("HTTP/1.1 400 "), "{text}");
    assert!(text.contains("Connection: close\r\n"));
}

#[tokio::test]
async fn oversized_request_is_413() {
    let mut config = test_config();
    config.max_request_bytes = 64;
    let (server, _base) = start(McpServer::builder(config)).await;
    let port = server.port().expect("running");

    let body = "x".repeat(200);
    let request = format!(
        "POST /mcp HTTP/1.1\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    let text = raw_exchange(port, request.as_bytes()).await;
    assert!(text.starts_with("HTTP/1.1 413 "), "{text}");
}

#[tokio::test]
async fn stop_closes_the_listener() {
    let (mut server, base) = start_plain().await;
    assert!(server.is_running());

    server.stop().await;
    assert!(!server.is_running());
    assert_eq!(server.port(), None);
    assert!(!server.status().await.expect("status").running);

    let result = client().get(format!("{base}/health")).send().await;
    assert!(result.is_err());
}
