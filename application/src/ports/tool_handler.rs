//! Tool handler port
//!
//! A [`ToolHandler`] is the executable half of a registered tool. Toolset
//! providers implement it once per operation and pair it with a
//! [`ToolDefinition`] in a [`ToolSpec`].
//!
//! Handlers receive a [`ToolRequest`] that carries the caller's identity, the
//! request's cancellation token and a handle back to the invoker. Nested
//! calls made through [`ToolRequest::call_nested`] therefore run with the
//! same identity and are cancelled together with the outer call.

use super::tool_invoker::ToolInvoker;
use async_trait::async_trait;
use kube_flow_domain::tool::is_confirmed;
use kube_flow_domain::{
    Identity, ToolArguments, ToolCall, ToolDefinition, ToolError, ToolResult, check_namespace,
};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Executable part of a tool
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn execute(&self, request: ToolRequest) -> Result<ToolResult, ToolError>;
}

/// A registered tool: its definition plus the handler that runs it.
#[derive(Clone)]
pub struct ToolSpec {
    definition: ToolDefinition,
    handler: Arc<dyn ToolHandler>,
}

impl ToolSpec {
    pub fn new<H: ToolHandler + 'static>(definition: ToolDefinition, handler: H) -> Self {
        Self {
            definition,
            handler: Arc::new(handler),
        }
    }

    pub fn from_arc(definition: ToolDefinition, handler: Arc<dyn ToolHandler>) -> Self {
        Self {
            definition,
            handler,
        }
    }

    pub fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn handler(&self) -> &Arc<dyn ToolHandler> {
        &self.handler
    }
}

impl fmt::Debug for ToolSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolSpec")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

/// Everything a handler gets for one invocation
#[derive(Clone)]
pub struct ToolRequest {
    tool_name: String,
    arguments: ToolArguments,
    identity: Arc<Identity>,
    cancellation: CancellationToken,
    invoker: Arc<dyn ToolInvoker>,
}

impl ToolRequest {
    pub fn new(
        call: ToolCall,
        identity: Arc<Identity>,
        cancellation: CancellationToken,
        invoker: Arc<dyn ToolInvoker>,
    ) -> Self {
        Self {
            tool_name: call.tool_name,
            arguments: call.arguments,
            identity,
            cancellation,
            invoker,
        }
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn arguments(&self) -> &ToolArguments {
        &self.arguments
    }

    pub fn identity(&self) -> &Arc<Identity> {
        &self.identity
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn invoker(&self) -> &Arc<dyn ToolInvoker> {
        &self.invoker
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(Value::as_str)
    }

    /// String argument, empty when absent
    pub fn string_or_empty(&self, key: &str) -> &str {
        self.get_string(key).unwrap_or("")
    }

    /// Non-empty string argument, or `InvalidArgument` naming this tool
    pub fn require_string(&self, key: &str) -> Result<&str, ToolError> {
        match self.get_string(key) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(ToolError::invalid_argument(
                &self.tool_name,
                format!("missing required argument: {}", key),
            )),
        }
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.arguments.get(key).and_then(Value::as_i64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.arguments.get(key).and_then(Value::as_bool)
    }

    pub fn is_confirmed(&self) -> bool {
        is_confirmed(&self.arguments)
    }

    /// Namespace authorization for the calling identity
    pub fn check_namespace(&self, namespace: &str, namespaced_resource: bool) -> Result<(), ToolError> {
        check_namespace(&self.identity, namespace, namespaced_resource)
    }

    /// Call another tool as the same caller.
    ///
    /// The nested call gets a child of this request's token, so cancelling
    /// the outer call cancels it too. Arguments are passed as given; no
    /// confirmation is added.
    pub async fn call_nested(&self, call: ToolCall) -> Result<ToolResult, ToolError> {
        self.invoker
            .call(call, Arc::clone(&self.identity), self.cancellation.child_token())
            .await
    }

    /// Call a tool that needs confirmation on behalf of a confirmed caller.
    ///
    /// Adds `confirm: true` to the nested call only when this request was
    /// itself confirmed; otherwise fails with `ConfirmationRequired` for the
    /// nested tool without calling it.
    pub async fn call_nested_confirmed(&self, call: ToolCall) -> Result<ToolResult, ToolError> {
        if !self.is_confirmed() {
            return Err(ToolError::confirmation_required(call.tool_name));
        }
        self.call_nested(call.confirmed()).await
    }
}

impl fmt::Debug for ToolRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRequest")
            .field("tool_name", &self.tool_name)
            .field("arguments", &self.arguments)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}
