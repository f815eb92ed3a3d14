//! Ordered tool registry and the tool execution contract.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::context::ToolContext;
use super::schema::ToolDescriptor;

/// Tool-level failure.
///
/// Always reported to the client as a successful JSON-RPC result with
/// `isError: true`; never converted into a protocol error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// A required argument is absent.
    MissingParameter(String),
    /// An argument is present but has the wrong shape.
    InvalidParameter {
        /// Argument name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
    /// A host capability the tool needs is not configured.
    CapabilityUnavailable(String),
    /// The tool ran and failed.
    Execution(String),
}

impl Display for ToolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingParameter(name) => write!(f, "missing parameter {name}"),
            Self::InvalidParameter { name, reason } => {
                write!(f, "invalid parameter {name}: {reason}")
            }
            Self::CapabilityUnavailable(name) => write!(f, "capability not available: {name}"),
            Self::Execution(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ToolError {}

/// Boxed future returned by [`Tool::execute`].
pub type ToolFuture = Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send>>;

/// An executable tool instance bound to an execution context.
pub trait Tool: Send {
    /// Run the tool once with the caller's arguments.
    fn execute(self: Box<Self>, arguments: Map<String, Value>) -> ToolFuture;
}

/// Produces a fresh [`Tool`] per call.
pub type ToolFactory = Arc<dyn Fn(ToolContext) -> Box<dyn Tool> + Send + Sync>;

struct FnTool<F> {
    context: ToolContext,
    handler: Arc<F>,
}

impl<F, Fut> Tool for FnTool<F>
where
    F: Fn(ToolContext, Map<String, Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
{
    fn execute(self: Box<Self>, arguments: Map<String, Value>) -> ToolFuture {
        let this = *self;
        Box::pin((this.handler)(this.context, arguments))
    }
}

/// Build a factory from an async closure.
pub fn tool_fn<F, Fut>(handler: F) -> ToolFactory
where
    F: Fn(ToolContext, Map<String, Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
{
    let handler = Arc::new(handler);
    Arc::new(move |context| {
        Box::new(FnTool {
            context,
            handler: Arc::clone(&handler),
        }) as Box<dyn Tool>
    })
}

struct Registration {
    descriptor: ToolDescriptor,
    factory: ToolFactory,
}

/// Name → factory mapping that remembers first-registration order.
#[derive(Default)]
pub struct ToolRegistry {
    entries: HashMap<String, Registration>,
    order: Vec<String>,
}

impl ToolRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a tool.
    ///
    /// Returns `true` when the name is new. A replaced tool keeps the
    /// position of its first registration.
    pub fn register(&mut self, descriptor: ToolDescriptor, factory: ToolFactory) -> bool {
        let name = descriptor.name.clone();
        let registration = Registration {
            descriptor,
            factory,
        };
        let added = self.entries.insert(name.clone(), registration).is_none();
        if added {
            self.order.push(name);
        }
        added
    }

    /// Factory registered under `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<ToolFactory> {
        self.entries
            .get(name)
            .map(|registration| Arc::clone(&registration.factory))
    }

    /// Descriptors in registration order.
    #[must_use]
    pub fn list_descriptors(&self) -> Vec<&ToolDescriptor> {
        self.order
            .iter()
            .filter_map(|name| self.entries.get(name))
            .map(|registration| &registration.descriptor)
            .collect()
    }

    /// Tool names in registration order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no tool is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
