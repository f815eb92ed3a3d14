//! Host-facing server lifecycle.
//!
//! [`McpServer`] wires the dispatcher task to the HTTP listener and exposes
//! start/stop, custom tool registration, and observer hooks to the
//! embedding application.

use std::fmt;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::http::listener::{bind_listener, spawn_accept_loop};
use crate::mcp::bridge::ScriptRunner;
use crate::mcp::context::{
    ExecutionContext, LogObserver, LogOverrides, StatusProvider, StatusSnapshot,
};
use crate::mcp::dispatcher::{Dispatcher, DispatcherHandle};
use crate::mcp::registry::{ToolFactory, ToolRegistry};
use crate::mcp::schema::ToolDescriptor;
use crate::mcp::tools::register_builtins;
use crate::Result;

/// Notified with the actually-bound port after a successful start.
pub type PortObserver = Arc<dyn Fn(u16) + Send + Sync>;

/// Builder for [`McpServer`].
#[derive(Default)]
pub struct McpServerBuilder {
    config: ServerConfig,
    script_runner: Option<ScriptRunner>,
    log_overrides: LogOverrides,
    log_observer: Option<LogObserver>,
    custom_status: Option<StatusProvider>,
    port_observer: Option<PortObserver>,
    tools: Vec<(ToolDescriptor, ToolFactory)>,
}

impl McpServerBuilder {
    /// Start from `config`.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Install the host's script primitive.
    #[must_use]
    pub fn script_runner(mut self, runner: ScriptRunner) -> Self {
        self.script_runner = Some(runner);
        self
    }

    /// Replace log retrieval, clearing, and/or writing.
    #[must_use]
    pub fn log_overrides(mut self, overrides: LogOverrides) -> Self {
        self.log_overrides = overrides;
        self
    }

    /// Observe every log line.
    #[must_use]
    pub fn on_log(mut self, observer: LogObserver) -> Self {
        self.log_observer = Some(observer);
        self
    }

    /// Observe the bound port.
    #[must_use]
    pub fn on_port_change(mut self, observer: PortObserver) -> Self {
        self.port_observer = Some(observer);
        self
    }

    /// Merge host-specific fields under `custom` in status output.
    #[must_use]
    pub fn custom_status(mut self, provider: StatusProvider) -> Self {
        self.custom_status = Some(provider);
        self
    }

    /// Register a custom tool after the built-ins.
    #[must_use]
    pub fn tool(mut self, descriptor: ToolDescriptor, factory: ToolFactory) -> Self {
        self.tools.push((descriptor, factory));
        self
    }

    /// Spawn the dispatcher task and return the (not yet listening) server.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn build(self) -> McpServer {
        let context = ExecutionContext::new(self.config.log_capacity)
            .with_script_runner(self.script_runner)
            .with_log_overrides(self.log_overrides)
            .with_log_observer(self.log_observer)
            .with_custom_status(self.custom_status);

        let mut registry = ToolRegistry::new();
        register_builtins(&mut registry);
        for (descriptor, factory) in self.tools {
            registry.register(descriptor, factory);
        }

        let (dispatcher, _task) = Dispatcher::spawn(context, registry);

        McpServer {
            config: self.config,
            dispatcher,
            port_observer: self.port_observer,
            listener: None,
        }
    }
}

struct RunningListener {
    port: u16,
    ct: CancellationToken,
    task: JoinHandle<()>,
}

/// An embeddable MCP server instance.
pub struct McpServer {
    config: ServerConfig,
    dispatcher: DispatcherHandle,
    port_observer: Option<PortObserver>,
    listener: Option<RunningListener>,
}

impl fmt::Debug for McpServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("McpServer")
            .field("config", &self.config)
            .field("port", &self.port())
            .finish_non_exhaustive()
    }
}

impl McpServer {
    /// Builder starting from `config`.
    #[must_use]
    pub fn builder(config: ServerConfig) -> McpServerBuilder {
        McpServerBuilder::new(config)
    }

    /// Server with built-in tools only and no script primitive.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self::builder(config).build()
    }

    /// Handle to the dispatcher task.
    #[must_use]
    pub fn dispatcher(&self) -> &DispatcherHandle {
        &self.dispatcher
    }

    /// Register or replace a tool at runtime.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Mcp` if the dispatcher task has stopped.
    pub fn register_tool(&self, descriptor: ToolDescriptor, factory: ToolFactory) -> Result<()> {
        self.dispatcher.register(descriptor, factory)
    }

    /// Append a line to the log buffer.
    pub fn log(&self, message: impl Into<String>) {
        self.dispatcher.log(message);
    }

    /// Bind the listener and start accepting connections.
    ///
    /// Returns the bound port, which may differ from the configured one.
    /// Calling `start` on a running server returns its current port.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for an invalid host and `AppError::Bind`
    /// once every port in the retry range has failed; the server then
    /// stays stopped and makes no further attempts.
    pub async fn start(&mut self) -> Result<u16> {
        if let Some(ref running) = self.listener {
            return Ok(running.port);
        }

        let host = self.config.host_addr()?;
        let (listener, port) =
            match bind_listener(host, self.config.port, self.config.max_port_retries).await {
                Ok(bound) => bound,
                Err(err) => {
                    error!(%err, preferred = self.config.port, "server failed to start");
                    self.dispatcher.log(format!("server failed to start: {err}"));
                    self.dispatcher.set_listening(0, false);
                    return Err(err);
                }
            };

        self.dispatcher.set_listening(port, true);
        self.dispatcher.log(format!("MCP server listening on {host}:{port}"));
        info!(%host, port, "MCP server listening");

        if let Some(ref observer) = self.port_observer {
            observer(port);
        }

        let ct = CancellationToken::new();
        let task = spawn_accept_loop(
            listener,
            self.dispatcher.clone(),
            self.config.max_request_bytes,
            ct.clone(),
        );
        self.listener = Some(RunningListener { port, ct, task });

        Ok(port)
    }

    /// Stop accepting connections. In-flight requests finish on their own.
    pub async fn stop(&mut self) {
        let Some(running) = self.listener.take() else {
            return;
        };

        running.ct.cancel();
        if let Err(err) = running.task.await {
            error!(%err, "listener task failed");
        }

        self.dispatcher.set_listening(running.port, false);
        self.dispatcher.log("MCP server stopped");
        info!(port = running.port, "MCP server stopped");
    }

    /// Whether the listener is up.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.listener.is_some()
    }

    /// Bound port while running.
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.listener.as_ref().map(|running| running.port)
    }

    /// Snapshot of server status.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Mcp` if the dispatcher task has stopped.
    pub async fn status(&self) -> Result<StatusSnapshot> {
        self.dispatcher.status().await
    }
}

impl Drop for McpServer {
    fn drop(&mut self) {
        if let Some(ref running) = self.listener {
            running.ct.cancel();
        }
    }
}
