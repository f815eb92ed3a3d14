#![forbid(unsafe_code)]

//! `mcpwebkit`: MCP control-plane server for an embedded page surface.
//!
//! The host supplies one callback-style script primitive; this crate turns
//! it into a JSON-RPC tool surface served over plain HTTP.

pub mod config;
pub mod errors;
pub mod http;
pub mod mcp;
pub mod server;

pub use config::ServerConfig;
pub use errors::{AppError, Result};
pub use server::{McpServer, McpServerBuilder};
