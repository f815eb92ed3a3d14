//! Model Context Protocol layer: schemas, registry, dispatcher, and the
//! script bridge.

pub mod bridge;
pub mod context;
pub mod dispatcher;
pub mod jsonrpc;
pub mod log_buffer;
pub mod registry;
pub mod schema;
pub mod tools;

/// MCP protocol revision announced during `initialize`.
pub const PROTOCOL_VERSION: &str = "2025-03-26";

/// Server name announced during `initialize` and in status output.
pub const SERVER_NAME: &str = "mcpwebkit";

/// Server version announced during `initialize` and in status output.
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
