//! Plain-HTTP transport: listener, request parsing, routing, responses.

pub mod listener;
pub mod request;
pub mod response;
pub mod router;
