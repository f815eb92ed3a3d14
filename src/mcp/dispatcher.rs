//! JSON-RPC dispatcher task.
//!
//! A single task owns the [`ToolRegistry`] and the [`ExecutionContext`] and
//! processes [`Command`]s one at a time, so neither needs a lock. Every
//! other task (connections, tool calls, the host) holds a cloneable
//! [`DispatcherHandle`] and gets answers back over `oneshot` channels.
//!
//! `tools/call` is the only method that does not answer inline: the tool
//! runs on its own task and replies when it finishes, while the dispatcher
//! keeps serving other commands.

use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, warn, Instrument};

use super::bridge::{start_script, ScriptCompletion};
use super::context::{ExecutionContext, StatusSnapshot, ToolContext};
use super::jsonrpc::{RpcError, RpcRequest, RpcResponse};
use super::registry::{ToolFactory, ToolRegistry};
use super::schema::ToolDescriptor;
use super::{PROTOCOL_VERSION, SERVER_NAME, SERVER_VERSION};
use crate::{AppError, Result};

/// Work items processed by the dispatcher task.
pub(crate) enum Command {
    Rpc {
        body: Vec<u8>,
        headers: Vec<String>,
        reply: oneshot::Sender<RpcResponse>,
    },
    Register {
        descriptor: ToolDescriptor,
        factory: ToolFactory,
    },
    Status {
        reply: oneshot::Sender<StatusSnapshot>,
    },
    Log {
        message: String,
    },
    ReadLogs {
        limit: Option<usize>,
        reply: oneshot::Sender<Vec<String>>,
    },
    ClearLogs {
        reply: oneshot::Sender<Option<usize>>,
    },
    RunScript {
        script: String,
        completion: ScriptCompletion,
    },
    SetListening {
        port: u16,
        running: bool,
    },
}

/// Cloneable sender side of the dispatcher task.
#[derive(Clone, Debug)]
pub struct DispatcherHandle {
    tx: mpsc::UnboundedSender<Command>,
}

fn closed<T>(_: T) -> AppError {
    AppError::Mcp("dispatcher is not running".into())
}

impl DispatcherHandle {
    fn send(&self, command: Command) -> Result<()> {
        self.tx.send(command).map_err(closed)
    }

    /// Dispatch one JSON-RPC request body and await its response.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Mcp` if the dispatcher task has stopped or the
    /// tool task went away without replying.
    pub async fn dispatch(&self, body: Vec<u8>, headers: Vec<String>) -> Result<RpcResponse> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Rpc {
            body,
            headers,
            reply,
        })?;
        rx.await
            .map_err(|_| AppError::Mcp("request dropped before a response was produced".into()))
    }

    /// Register or replace a tool.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Mcp` if the dispatcher task has stopped.
    pub fn register(&self, descriptor: ToolDescriptor, factory: ToolFactory) -> Result<()> {
        self.send(Command::Register {
            descriptor,
            factory,
        })
    }

    /// Snapshot of server status.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Mcp` if the dispatcher task has stopped.
    pub async fn status(&self) -> Result<StatusSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Status { reply })?;
        rx.await.map_err(closed)
    }

    /// Append a log line. Dropped silently once the dispatcher has stopped.
    pub fn log(&self, message: impl Into<String>) {
        let _ = self.send(Command::Log {
            message: message.into(),
        });
    }

    /// Log lines, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Mcp` if the dispatcher task has stopped.
    pub async fn read_logs(&self, limit: Option<usize>) -> Result<Vec<String>> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::ReadLogs { limit, reply })?;
        rx.await.map_err(closed)
    }

    /// Clear the log buffer.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Mcp` if the dispatcher task has stopped.
    pub async fn clear_logs(&self) -> Result<Option<usize>> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::ClearLogs { reply })?;
        rx.await.map_err(closed)
    }

    /// Ask the dispatcher task to invoke the script runner.
    pub(crate) fn run_script(&self, script: String, completion: ScriptCompletion) {
        if let Err(mpsc::error::SendError(command)) =
            self.tx.send(Command::RunScript { script, completion })
        {
            if let Command::RunScript { completion, .. } = command {
                completion.fail("dispatcher is not running");
            }
        }
    }

    /// Record the listener's port and running flag.
    pub(crate) fn set_listening(&self, port: u16, running: bool) {
        let _ = self.send(Command::SetListening { port, running });
    }
}

/// Text content item of a tool result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextContent {
    /// Always `"text"`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Payload.
    pub text: String,
}

/// `tools/call` result body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolCallResult {
    /// Content items; always exactly one text item.
    pub content: Vec<TextContent>,
    /// Whether the tool failed.
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Wrap a successful tool value.
    #[must_use]
    pub fn success(value: &Value) -> Self {
        Self::text(encode_tool_value(value), false)
    }

    /// Wrap a tool failure message.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self::text(message.into(), true)
    }

    fn text(text: String, is_error: bool) -> Self {
        Self {
            content: vec![TextContent { kind: "text", text }],
            is_error,
        }
    }

    fn into_value(self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Render a tool return value as the text of a content item.
///
/// Objects and arrays become compact JSON, strings pass through unchanged,
/// and scalars use their JSON text.
#[must_use]
pub fn encode_tool_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "serverInfo": { "name": SERVER_NAME, "version": SERVER_VERSION },
        "capabilities": { "tools": {} },
    })
}

/// Owner of the registry and execution context.
pub struct Dispatcher {
    context: ExecutionContext,
    registry: ToolRegistry,
    self_tx: mpsc::WeakUnboundedSender<Command>,
}

impl Dispatcher {
    /// Spawn the dispatcher task.
    ///
    /// The task ends once every [`DispatcherHandle`] has been dropped.
    #[must_use]
    pub fn spawn(
        context: ExecutionContext,
        registry: ToolRegistry,
    ) -> (DispatcherHandle, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut dispatcher = Self {
            context,
            registry,
            self_tx: tx.downgrade(),
        };

        let task = tokio::spawn(
            async move {
                while let Some(command) = rx.recv().await {
                    dispatcher.handle(command);
                }
                debug!("dispatcher stopped");
            }
            .instrument(info_span!("dispatcher")),
        );

        (DispatcherHandle { tx }, task)
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Rpc {
                body,
                headers,
                reply,
            } => self.handle_rpc(&body, &headers, reply),
            Command::Register {
                descriptor,
                factory,
            } => {
                let name = descriptor.name.clone();
                if self.registry.register(descriptor, factory) {
                    debug!(tool = %name, "tool registered");
                } else {
                    info!(tool = %name, "tool re-registered");
                }
            }
            Command::Status { reply } => {
                let _ = reply.send(self.context.snapshot(self.registry.len()));
            }
            Command::Log { message } => self.context.write_log(&message),
            Command::ReadLogs { limit, reply } => {
                let _ = reply.send(self.context.read_logs(limit));
            }
            Command::ClearLogs { reply } => {
                let _ = reply.send(self.context.clear_logs());
            }
            Command::RunScript { script, completion } => {
                start_script(self.context.script_runner(), script, completion);
            }
            Command::SetListening { port, running } => {
                self.context.set_listening(port, running);
            }
        }
    }

    fn handle_rpc(&mut self, body: &[u8], headers: &[String], reply: oneshot::Sender<RpcResponse>) {
        let request = match RpcRequest::parse(body) {
            Ok(request) => request,
            Err(id) => {
                warn!(bytes = body.len(), "unparsable JSON-RPC body");
                self.context.write_log("JSON-RPC parse error");
                let _ = reply.send(RpcResponse::failure(id, RpcError::parse_error()));
                return;
            }
        };

        debug!(method = %request.method, headers = headers.len(), "JSON-RPC request");

        let response = match request.method.as_str() {
            "initialize" => {
                self.context.write_log("MCP initialize");
                RpcResponse::success(request.id, initialize_result())
            }
            "initialized" | "notifications/initialized" => {
                RpcResponse::success(request.id, json!({}))
            }
            "tools/list" => {
                let tools = self.registry.list_descriptors();
                RpcResponse::success(request.id, json!({ "tools": tools }))
            }
            "tools/call" => {
                self.call_tool(request, reply);
                return;
            }
            other => {
                warn!(method = %other, "unknown JSON-RPC method");
                self.context.write_log(&format!("Method not found: {other}"));
                RpcResponse::failure(request.id, RpcError::method_not_found(other))
            }
        };

        let _ = reply.send(response);
    }

    fn call_tool(&mut self, request: RpcRequest, reply: oneshot::Sender<RpcResponse>) {
        let params = request.params_object();
        let id = request.id;

        let Some(name) = params.get("name").and_then(Value::as_str).map(str::to_owned) else {
            self.context.write_log("tools/call without a tool name");
            let _ = reply.send(RpcResponse::failure(
                id,
                RpcError::invalid_params("Missing tool name"),
            ));
            return;
        };

        let arguments = match params.get("arguments") {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };

        let Some(factory) = self.registry.lookup(&name) else {
            warn!(tool = %name, "unknown tool");
            let message = format!("Unknown tool: {name}");
            self.context.write_log(&message);
            let result = ToolCallResult::failure(message).into_value();
            let _ = reply.send(RpcResponse::success(id, result));
            return;
        };

        let Some(tx) = self.self_tx.upgrade() else {
            let result = ToolCallResult::failure("dispatcher is not running").into_value();
            let _ = reply.send(RpcResponse::success(id, result));
            return;
        };

        self.context.write_log(&format!("tools/call {name}"));
        let context = ToolContext::new(DispatcherHandle { tx });
        let log = context.clone();
        let tool = factory(context);

        let span = info_span!("call_tool", tool = %name);
        tokio::spawn(
            async move {
                let result = match tool.execute(arguments).await {
                    Ok(value) => ToolCallResult::success(&value),
                    Err(err) => {
                        warn!(%err, "tool failed");
                        log.log(format!("tool {name} failed: {err}"));
                        ToolCallResult::failure(err.to_string())
                    }
                };
                if reply.send(RpcResponse::success(id, result.into_value())).is_err() {
                    debug!("client went away before the tool finished");
                }
            }
            .instrument(span),
        );
    }
}
