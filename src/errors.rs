//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering infrastructure failure modes.
///
/// Protocol-level and tool-level failures have their own types in
/// [`crate::mcp::jsonrpc::RpcError`] and [`crate::mcp::tools::ToolError`];
/// they are recovered inside a single request and never surface here.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// No listening port could be acquired.
    Bind(String),
    /// HTTP transport failure on a single connection.
    Transport(String),
    /// MCP dispatcher failure (e.g. dispatcher task no longer running).
    Mcp(String),
    /// File-system or socket I/O failure.
    Io(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Bind(msg) => write!(f, "bind: {msg}"),
            Self::Transport(msg) => write!(f, "transport: {msg}"),
            Self::Mcp(msg) => write!(f, "mcp: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
