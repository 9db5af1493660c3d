//! Tool domain value objects: immutable result and error types
//!
//! Every tool execution produces either a [`ToolResult`] or a [`ToolError`].
//! Both travel back to the caller untouched: external clients and the flow
//! planner inspect error detail, so nothing in between rewrites them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error produced while registering, dispatching or executing a tool.
///
/// | Code | Raised by |
/// |------|-----------|
/// | `NOT_FOUND` | Invoker, unknown tool |
/// | `DUPLICATE_NAME` | Registry, name collision |
/// | `CONFIRMATION_REQUIRED` | Invoker, risky/destructive call without `confirm` |
/// | `FORBIDDEN` | Invoker policy or namespace authorization |
/// | `INVALID_ARGUMENT` | Handlers, flow planner |
/// | `INVALID_PAYLOAD` | Graph parser |
/// | `EXECUTION_FAILED` | Handlers |
/// | `CANCELLED` | Invoker, when the request token fires |
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("Tool not found: {name}")]
    NotFound { name: String },

    #[error("Tool already registered: {name}")]
    DuplicateName { name: String },

    #[error("Tool '{tool}' requires confirmation (pass \"confirm\": true)")]
    ConfirmationRequired { tool: String },

    #[error("Forbidden: {target}: {reason}")]
    Forbidden { target: String, reason: String },

    #[error("Invalid argument for '{tool}': {message}")]
    InvalidArgument { tool: String, message: String },

    #[error("Invalid payload from '{source_name}': {message}")]
    InvalidPayload { source_name: String, message: String },

    #[error("Tool '{tool}' failed: {message}")]
    ExecutionFailed { tool: String, message: String },

    #[error("Tool '{tool}' was cancelled")]
    Cancelled { tool: String },
}

impl ToolError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }

    pub fn confirmation_required(tool: impl Into<String>) -> Self {
        Self::ConfirmationRequired { tool: tool.into() }
    }

    pub fn forbidden(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Forbidden {
            target: target.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_argument(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn invalid_payload(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPayload {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn execution_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn cancelled(tool: impl Into<String>) -> Self {
        Self::Cancelled { tool: tool.into() }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ToolError::NotFound { .. } => "NOT_FOUND",
            ToolError::DuplicateName { .. } => "DUPLICATE_NAME",
            ToolError::ConfirmationRequired { .. } => "CONFIRMATION_REQUIRED",
            ToolError::Forbidden { .. } => "FORBIDDEN",
            ToolError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            ToolError::InvalidPayload { .. } => "INVALID_PAYLOAD",
            ToolError::ExecutionFailed { .. } => "EXECUTION_FAILED",
            ToolError::Cancelled { .. } => "CANCELLED",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ToolError::Cancelled { .. })
    }
}

/// Result of a tool execution.
///
/// The payload is opaque to the dispatcher; the metadata tells callers which
/// namespaces and resources the handler touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool-specific output
    pub payload: Value,
    /// What the execution touched
    #[serde(default)]
    pub metadata: ToolResultMetadata,
}

/// Structured metadata about tool execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResultMetadata {
    /// Namespaces read or written
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<String>,
    /// Resources read or written, as graph node ids
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
    /// Duration of execution in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl ToolResult {
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            metadata: ToolResultMetadata::default(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        if !namespace.is_empty() && !self.metadata.namespaces.contains(&namespace) {
            self.metadata.namespaces.push(namespace);
        }
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        let resource = resource.into();
        if !self.metadata.resources.contains(&resource) {
            self.metadata.resources.push(resource);
        }
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.metadata.duration_ms = Some(duration_ms);
        self
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }
}
