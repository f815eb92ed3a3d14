//! HTTP response construction and serialization.

use serde::Serialize;

use crate::mcp::jsonrpc::{sanitize, INTERNAL_ERROR_BODY};

/// `Content-Type` for JSON bodies.
pub const CONTENT_TYPE_JSON: &str = "application/json";
/// `Content-Type` for HTML bodies.
pub const CONTENT_TYPE_HTML: &str = "text/html; charset=utf-8";
/// `Content-Type` for plain-text bodies.
pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

/// A complete response; always written with `Connection: close`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// `Content-Type` header value.
    pub content_type: &'static str,
    /// Body bytes.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Response with a raw JSON body.
    #[must_use]
    pub fn json_bytes(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: CONTENT_TYPE_JSON,
            body,
        }
    }

    /// Response carrying `value` as sanitized JSON, or a 500 if it cannot
    /// be serialized.
    #[must_use]
    pub fn json<T: Serialize + ?Sized>(status: u16, value: &T) -> Self {
        match sanitize(value).and_then(|tree| serde_json::to_vec(&tree)) {
            Ok(body) => Self::json_bytes(status, body),
            Err(_) => Self::internal_error(),
        }
    }

    /// HTML response.
    #[must_use]
    pub fn html(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: CONTENT_TYPE_HTML,
            body: body.into().into_bytes(),
        }
    }

    /// Plain-text response.
    #[must_use]
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: CONTENT_TYPE_TEXT,
            body: body.into().into_bytes(),
        }
    }

    /// `404 Not Found`.
    #[must_use]
    pub fn not_found() -> Self {
        Self::text(404, "Not Found")
    }

    /// `500` with the fixed JSON-RPC internal-error body.
    #[must_use]
    pub fn internal_error() -> Self {
        Self::json_bytes(500, INTERNAL_ERROR_BODY.as_bytes().to_vec())
    }

    /// Serialize status line, headers, blank line, and body.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let head = format!(
            "HTTP/1.1 {} {}\r\n\
             Content-Type: {}\r\n\
             Content-Length: {}\r\n\
             Access-Control-Allow-Origin: *\r\n\
             Connection: close\r\n\
             \r\n",
            self.status,
            reason_phrase(self.status),
            self.content_type,
            self.body.len(),
        );
        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

/// Reason phrase written on the status line.
#[must_use]
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        _ => "Error",
    }
}
