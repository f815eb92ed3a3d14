//! Execution context owned by the dispatcher, and the handle tools use to
//! reach it.
//!
//! [`ExecutionContext`] is plain owned state: port, running flag, script
//! runner, log buffer, and host hooks. Only the dispatcher task mutates it.
//! Tools get a [`ToolContext`], which forwards every state access back onto
//! the dispatcher task and receives snapshots in return.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use super::bridge::{pending_call, ScriptRunner};
use super::dispatcher::DispatcherHandle;
use super::log_buffer::{LogBuffer, LogEntry};
use super::registry::ToolError;
use super::{SERVER_NAME, SERVER_VERSION};

/// Replacement for reading the log buffer.
pub type LogReader = Arc<dyn Fn() -> Vec<String> + Send + Sync>;
/// Replacement for clearing the log buffer.
pub type LogClearer = Arc<dyn Fn() + Send + Sync>;
/// Replacement for appending to the log buffer; receives the raw message.
pub type LogWriter = Arc<dyn Fn(&str) + Send + Sync>;
/// Notified with every rendered log line.
pub type LogObserver = Arc<dyn Fn(&str) + Send + Sync>;
/// Supplies host-specific fields merged under `custom` in status output.
pub type StatusProvider = Arc<dyn Fn() -> Map<String, Value> + Send + Sync>;

/// Host-supplied overrides for log operations.
///
/// Each override present fully replaces the internal buffer for that
/// operation.
#[derive(Clone, Default)]
pub struct LogOverrides {
    /// Replaces log retrieval.
    pub read: Option<LogReader>,
    /// Replaces log clearing.
    pub clear: Option<LogClearer>,
    /// Replaces log appending.
    pub write: Option<LogWriter>,
}

impl fmt::Debug for LogOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogOverrides")
            .field("read", &self.read.is_some())
            .field("clear", &self.clear.is_some())
            .field("write", &self.write.is_some())
            .finish()
    }
}

/// Point-in-time copy of server status.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    /// Server name.
    pub server: String,
    /// Server version.
    pub version: String,
    /// Bound port (`0` before the listener is up).
    pub port: u16,
    /// Whether the listener is accepting connections.
    pub running: bool,
    /// Number of registered tools.
    pub tool_count: usize,
    /// Whether a script runner is configured.
    pub scripting_available: bool,
    /// Host-supplied extra fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<Map<String, Value>>,
}

/// Process-wide state for one server instance.
pub struct ExecutionContext {
    port: u16,
    running: bool,
    script_runner: Option<ScriptRunner>,
    logs: LogBuffer,
    overrides: LogOverrides,
    log_observer: Option<LogObserver>,
    custom_status: Option<StatusProvider>,
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("port", &self.port)
            .field("running", &self.running)
            .field("scripting_available", &self.script_runner.is_some())
            .field("log_len", &self.logs.len())
            .field("overrides", &self.overrides)
            .finish_non_exhaustive()
    }
}

impl ExecutionContext {
    /// Create a context with an empty log buffer of `log_capacity` lines.
    #[must_use]
    pub fn new(log_capacity: usize) -> Self {
        Self {
            port: 0,
            running: false,
            script_runner: None,
            logs: LogBuffer::with_capacity(log_capacity),
            overrides: LogOverrides::default(),
            log_observer: None,
            custom_status: None,
        }
    }

    /// Install the host's script primitive.
    #[must_use]
    pub fn with_script_runner(mut self, runner: Option<ScriptRunner>) -> Self {
        self.script_runner = runner;
        self
    }

    /// Install log overrides.
    #[must_use]
    pub fn with_log_overrides(mut self, overrides: LogOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Install a log-line observer.
    #[must_use]
    pub fn with_log_observer(mut self, observer: Option<LogObserver>) -> Self {
        self.log_observer = observer;
        self
    }

    /// Install a custom status provider.
    #[must_use]
    pub fn with_custom_status(mut self, provider: Option<StatusProvider>) -> Self {
        self.custom_status = provider;
        self
    }

    /// Configured script primitive, if any.
    #[must_use]
    pub fn script_runner(&self) -> Option<&ScriptRunner> {
        self.script_runner.as_ref()
    }

    /// Record listener state.
    pub fn set_listening(&mut self, port: u16, running: bool) {
        self.port = port;
        self.running = running;
    }

    /// Append a log line (or forward it to the write override).
    pub fn write_log(&mut self, message: &str) {
        let rendered = match self.overrides.write {
            Some(ref write) => {
                write(message);
                LogEntry {
                    timestamp: chrono::Utc::now(),
                    message: message.to_owned(),
                }
                .render()
            }
            None => self.logs.push(message).render(),
        };
        if let Some(ref observer) = self.log_observer {
            observer(&rendered);
        }
    }

    /// Log lines, oldest first; `limit` keeps only the newest `n`.
    #[must_use]
    pub fn read_logs(&self, limit: Option<usize>) -> Vec<String> {
        match self.overrides.read {
            Some(ref read) => {
                let mut lines = read();
                if let Some(n) = limit {
                    let skip = lines.len().saturating_sub(n);
                    lines.drain(..skip);
                }
                lines
            }
            None => self.logs.lines(limit),
        }
    }

    /// Clear the logs. Returns the number of dropped lines when known.
    pub fn clear_logs(&mut self) -> Option<usize> {
        match self.overrides.clear {
            Some(ref clear) => {
                clear();
                None
            }
            None => Some(self.logs.clear()),
        }
    }

    /// Number of lines in the internal buffer.
    #[must_use]
    pub fn log_len(&self) -> usize {
        self.logs.len()
    }

    /// Build a status snapshot.
    #[must_use]
    pub fn snapshot(&self, tool_count: usize) -> StatusSnapshot {
        StatusSnapshot {
            server: SERVER_NAME.to_owned(),
            version: SERVER_VERSION.to_owned(),
            port: self.port,
            running: self.running,
            tool_count,
            scripting_available: self.script_runner.is_some(),
            custom: self.custom_status.as_ref().map(|provider| provider()),
        }
    }
}

/// Handle through which a tool instance reaches its execution context.
#[derive(Clone, Debug)]
pub struct ToolContext {
    handle: DispatcherHandle,
}

impl ToolContext {
    pub(crate) fn new(handle: DispatcherHandle) -> Self {
        Self { handle }
    }

    /// Current server status.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::Execution` if the dispatcher has stopped.
    pub async fn status(&self) -> Result<StatusSnapshot, ToolError> {
        self.handle.status().await.map_err(stopped)
    }

    /// Buffered log lines, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::Execution` if the dispatcher has stopped.
    pub async fn logs(&self, limit: Option<usize>) -> Result<Vec<String>, ToolError> {
        self.handle.read_logs(limit).await.map_err(stopped)
    }

    /// Clear the log buffer.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::Execution` if the dispatcher has stopped.
    pub async fn clear_logs(&self) -> Result<Option<usize>, ToolError> {
        self.handle.clear_logs().await.map_err(stopped)
    }

    /// Append a line to the log buffer.
    pub fn log(&self, message: impl Into<String>) {
        self.handle.log(message);
    }

    /// Run a script through the host primitive and await its outcome.
    ///
    /// The primitive is invoked on the dispatcher task; the result is
    /// delivered back to this task through a single-fire slot.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::CapabilityUnavailable` when no runner is
    /// configured and `ToolError::Execution` when the script fails.
    pub async fn await_script(&self, script: impl Into<String>) -> Result<Value, ToolError> {
        let (completion, pending) = pending_call();
        self.handle.run_script(script.into(), completion);
        pending.wait().await
    }
}

fn stopped(err: crate::AppError) -> ToolError {
    ToolError::Execution(err.to_string())
}
