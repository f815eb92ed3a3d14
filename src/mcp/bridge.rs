//! Callback-to-await bridge for the host's script primitive.
//!
//! The host exposes one callback-style function, [`ScriptRunner`]: it is
//! handed a script and a [`ScriptCompletion`] and must signal that
//! completion exactly once, from any thread. Every signalling method takes
//! `self` by value, so a second signal cannot be expressed. The waiting
//! side, [`PendingScript`], resolves exactly once as well.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, warn};
use uuid::Uuid;

use super::jsonrpc::sanitize;
use super::registry::ToolError;

/// Host-supplied script primitive.
///
/// Must not block: it should hand the script to the rendering surface and
/// return, signalling the completion later.
pub type ScriptRunner = Arc<dyn Fn(String, ScriptCompletion) + Send + Sync>;

/// Capability name reported when no [`ScriptRunner`] is configured.
pub const SCRIPT_CAPABILITY: &str = "script execution";

#[derive(Debug)]
enum Delivery {
    Value(Value),
    Failed(String),
    Unavailable,
}

/// Single-fire completion slot for one script invocation.
pub struct ScriptCompletion {
    call_id: Uuid,
    tx: oneshot::Sender<Delivery>,
}

impl fmt::Debug for ScriptCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptCompletion")
            .field("call_id", &self.call_id)
            .finish_non_exhaustive()
    }
}

impl ScriptCompletion {
    /// Identity of the call this slot belongs to.
    #[must_use]
    pub fn call_id(&self) -> Uuid {
        self.call_id
    }

    /// Deliver either a value or an error message.
    pub fn complete(self, outcome: Result<Value, String>) {
        match outcome {
            Ok(value) => self.succeed(&value),
            Err(message) => self.fail(message),
        }
    }

    /// Deliver a successful result. Non-finite floats become `null`.
    pub fn succeed<T: Serialize + ?Sized>(self, value: &T) {
        let delivery = match sanitize(value) {
            Ok(value) => Delivery::Value(value),
            Err(err) => Delivery::Failed(format!("script result is not JSON-compatible: {err}")),
        };
        self.deliver(delivery);
    }

    /// Deliver the absence-of-value marker (`null`).
    pub fn succeed_empty(self) {
        self.deliver(Delivery::Value(Value::Null));
    }

    /// Deliver an error.
    pub fn fail(self, message: impl Into<String>) {
        self.deliver(Delivery::Failed(message.into()));
    }

    pub(crate) fn unavailable(self) {
        self.deliver(Delivery::Unavailable);
    }

    fn deliver(self, delivery: Delivery) {
        if self.tx.send(delivery).is_err() {
            debug!(call_id = %self.call_id, "script result arrived after waiter went away");
        }
    }
}

/// Waiting half of a script invocation.
#[derive(Debug)]
pub struct PendingScript {
    call_id: Uuid,
    rx: oneshot::Receiver<Delivery>,
}

impl PendingScript {
    /// Identity of the call being awaited.
    #[must_use]
    pub fn call_id(&self) -> Uuid {
        self.call_id
    }

    /// Suspend until the completion is signalled.
    ///
    /// No timeout is applied.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::CapabilityUnavailable` when no runner is
    /// configured, `ToolError::Execution` when the script failed or its
    /// completion was dropped without being signalled.
    pub async fn wait(self) -> Result<Value, ToolError> {
        match self.rx.await {
            Ok(Delivery::Value(value)) => Ok(value),
            Ok(Delivery::Failed(message)) => Err(ToolError::Execution(message)),
            Ok(Delivery::Unavailable) => Err(ToolError::CapabilityUnavailable(
                SCRIPT_CAPABILITY.to_owned(),
            )),
            Err(_) => {
                warn!(call_id = %self.call_id, "script completion dropped without a result");
                Err(ToolError::Execution("script completion dropped".into()))
            }
        }
    }
}

/// Create a linked completion slot and waiter for a new call.
#[must_use]
pub fn pending_call() -> (ScriptCompletion, PendingScript) {
    let call_id = Uuid::new_v4();
    let (tx, rx) = oneshot::channel();
    (ScriptCompletion { call_id, tx }, PendingScript { call_id, rx })
}

/// Hand a script to the runner, or fail the completion immediately when no
/// runner is configured.
pub fn start_script(runner: Option<&ScriptRunner>, script: String, completion: ScriptCompletion) {
    match runner {
        Some(runner) => {
            debug!(call_id = %completion.call_id(), bytes = script.len(), "invoking script runner");
            runner(script, completion);
        }
        None => completion.unavailable(),
    }
}

/// Run `script` through `runner` and await its single outcome.
///
/// # Errors
///
/// See [`PendingScript::wait`].
pub async fn await_script(
    runner: Option<&ScriptRunner>,
    script: impl Into<String>,
) -> Result<Value, ToolError> {
    let (completion, pending) = pending_call();
    start_script(runner, script.into(), completion);
    pending.wait().await
}
