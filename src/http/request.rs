//! Minimal HTTP/1.x request parsing.
//!
//! The request line and headers are split on CRLF; the body is everything
//! after the first blank line (CRLFCRLF). Chunked transfer-encoding and
//! pipelined requests are not supported.

use std::fmt::{Display, Formatter};

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Reasons a buffered request could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No bytes were received.
    Empty,
    /// The request line or headers are not valid UTF-8.
    Encoding,
    /// The request line does not have a method and a target.
    MalformedRequestLine(String),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => f.write_str("empty request"),
            Self::Encoding => f.write_str("request head is not valid UTF-8"),
            Self::MalformedRequestLine(line) => write!(f, "malformed request line: {line}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// A parsed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Verb, e.g. `GET`.
    pub method: String,
    /// Request target including any query string.
    pub target: String,
    /// Protocol version token, e.g. `HTTP/1.1` (empty if omitted).
    pub version: String,
    /// Raw header lines, without the trailing CRLF.
    pub headers: Vec<String>,
    /// Body bytes.
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Parse a fully buffered request.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when the buffer is empty, the head is not
    /// UTF-8, or the request line is malformed.
    pub fn parse(raw: &[u8]) -> Result<Self, ParseError> {
        if raw.is_empty() {
            return Err(ParseError::Empty);
        }

        let (head, body) = match header_end(raw) {
            Some(end) => (&raw[..end], &raw[end + HEADER_TERMINATOR.len()..]),
            None => (raw, &[][..]),
        };

        let head = std::str::from_utf8(head).map_err(|_| ParseError::Encoding)?;
        let mut lines = head.split("\r\n");
        let request_line = lines.next().unwrap_or_default();

        let mut parts = request_line.split_whitespace();
        let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
            return Err(ParseError::MalformedRequestLine(request_line.to_owned()));
        };
        let version = parts.next().unwrap_or_default();

        let headers: Vec<String> = lines
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect();

        let mut request = Self {
            method: method.to_owned(),
            target: target.to_owned(),
            version: version.to_owned(),
            headers,
            body: body.to_vec(),
        };

        if let Some(length) = request.content_length() {
            request.body.truncate(length);
        }

        Ok(request)
    }

    /// Target without its query string.
    #[must_use]
    pub fn path(&self) -> &str {
        self.target
            .split_once('?')
            .map_or(self.target.as_str(), |(path, _)| path)
    }

    /// Value of the first header named `name` (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(self.headers.iter().map(String::as_str), name)
    }

    /// Parsed `Content-Length`, if present and numeric.
    #[must_use]
    pub fn content_length(&self) -> Option<usize> {
        self.header("content-length")
            .and_then(|value| value.parse().ok())
    }
}

fn header_value<'a>(mut lines: impl Iterator<Item = &'a str>, name: &str) -> Option<&'a str> {
    lines.find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then_some(value.trim())
    })
}

/// Offset of the blank line separating head and body.
#[must_use]
pub fn header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADER_TERMINATOR.len())
        .position(|window| window == HEADER_TERMINATOR)
}

/// Whether `buf` holds a complete request: the head is terminated and at
/// least `Content-Length` body bytes have arrived.
#[must_use]
pub fn is_complete(buf: &[u8]) -> bool {
    let Some(end) = header_end(buf) else {
        return false;
    };
    let Ok(head) = std::str::from_utf8(&buf[..end]) else {
        return true;
    };
    let length = header_value(head.split("\r\n").skip(1), "content-length")
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(0);
    buf.len() - (end + HEADER_TERMINATOR.len()) >= length
}
