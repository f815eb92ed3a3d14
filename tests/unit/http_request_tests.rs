//! Unit tests for HTTP request parsing and response encoding.

use mcpwebkit::http::request::{is_complete, HttpRequest, ParseError};
use mcpwebkit::http::response::{reason_phrase, HttpResponse, CONTENT_TYPE_JSON};

#[test]
fn parses_request_line_headers_and_body() {
    let raw = b"POST /mcp?session=1 HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: 2\r\n\r\n{}";
    let request = HttpRequest::parse(raw).expect("parse");

    assert_eq!(request.method, "POST");
    assert_eq!(request.target, "/mcp?session=1");
    assert_eq!(request.path(), "/mcp");
    assert_eq!(request.version, "HTTP/1.1");
    assert_eq!(request.headers.len(), 3);
    assert_eq!(request.body, b"{}");
}

#[test]
fn header_lookup_ignores_case() {
    let raw = b"GET / HTTP/1.1\r\ncontent-LENGTH: 0\r\nX-Trace:  abc \r\n\r\n";
    let request = HttpRequest::parse(raw).expect("parse");
    assert_eq!(request.header("Content-Length"), Some("0"));
    assert_eq!(request.header("x-trace"), Some("abc"));
    assert_eq!(request.header("missing"), None);
}

#[test]
fn body_is_truncated_to_content_length() {
    let raw = b"POST /mcp HTTP/1.1\r\nContent-Length: 3\r\n\r\nabcdef";
    let request = HttpRequest::parse(raw).expect("parse");
    assert_eq!(request.body, b"abc");
}

#[test]
fn request_without_blank_line_has_empty_body() {
    let request = HttpRequest::parse(b"GET /health HTTP/1.1").expect("parse");
    assert_eq!(request.path(), "/health");
    assert!(request.body.is_empty());
}

#[test]
fn malformed_inputs_are_rejected() {
    assert_eq!(HttpRequest::parse(b""), Err(ParseError::Empty));
    assert!(matches!(
        HttpRequest::parse(b"GARBAGE\r\n\r\n"),
        Err(ParseError::MalformedRequestLine(_))
    ));
    assert_eq!(
        HttpRequest::parse(b"GET /\xff HTTP/1.1\r\n\r\n"),
        Err(ParseError::Encoding)
    );
}

#[test]
fn completeness_waits_for_the_declared_body() {
    assert!(!is_complete(b"GET / HTTP/1.1\r\nHost: x"));
    assert!(is_complete(b"GET / HTTP/1.1\r\n\r\n"));
    assert!(!is_complete(b"POST /mcp HTTP/1.1\r\nContent-Length: 5\r\n\r\nab"));
    assert!(is_complete(b"POST /mcp HTTP/1.1\r\nContent-Length: 5\r\n\r\nabcde"));
}

#[test]
fn response_wire_format_closes_the_connection() {
    let response = HttpResponse::json_bytes(200, b"{\"ok\":true}".to_vec());
    assert_eq!(response.content_type, CONTENT_TYPE_JSON);

    let text = String::from_utf8(response.to_bytes()).expect("utf8");
    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(text.contains("Content-Type: application/json\r\n"));
    assert!(text.contains("Content-Length: 11\r\n"));
    assert!(text.contains("Access-Control-Allow-Origin: *\r\n"));
    assert!(text.ends_with("Connection: close\r\n\r\n{\"ok\":true}"));
}

#[test]
fn not_found_has_plain_body() {
    let response = HttpResponse::not_found();
    assert_eq!(response.status, 404);
    assert_eq!(response.body, b"Not Found");
    assert!(String::from_utf8(response.to_bytes())
        .expect("utf8")
        .starts_with("HTTP/1.1 404 Not Found\r\n"));
}

#[test]
fn internal_error_is_json_rpc_shaped() {
    let response = HttpResponse::internal_error();
    assert_eq!(response.status, 500);
    let value: serde_json::Value = serde_json::from_slice(&response.body).expect("json");
    assert_eq!(value["error"]["code"], -32603);
}

#[test]
fn other_statuses_use_generic_reason() {
    assert_eq!(reason_phrase(200), "OK");
    assert_eq!(reason_phrase(404), "Not Found");
    assert_eq!(reason_phrase(500), "Error");
    assert_eq!(reason_phrase(413), "Error");
}
