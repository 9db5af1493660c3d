//! Tool domain entities

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Argument mapping passed to every tool.
pub type ToolArguments = serde_json::Map<String, Value>;

/// Name of the argument that carries an explicit confirmation.
pub const CONFIRM_ARG: &str = "confirm";

/// Safety classification of a tool operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyLevel {
    /// Observes state only (describe, list, diagnose)
    ReadOnly,
    /// Modifies state in an easily reversible way (label, annotate)
    Write,
    /// Modifies state in a way that may disrupt workloads (scale, restart)
    RiskyWrite,
    /// Removes state (delete, uninstall)
    Destructive,
}

impl SafetyLevel {
    pub fn as_str(&self) -> &str {
        match self {
            SafetyLevel::ReadOnly => "read_only",
            SafetyLevel::Write => "write",
            SafetyLevel::RiskyWrite => "risky_write",
            SafetyLevel::Destructive => "destructive",
        }
    }

    /// Whether calls must carry `confirm: true`
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, SafetyLevel::RiskyWrite | SafetyLevel::Destructive)
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, SafetyLevel::ReadOnly)
    }

    pub fn is_destructive(&self) -> bool {
        matches!(self, SafetyLevel::Destructive)
    }
}

impl std::fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Declarative description of a registered tool.
///
/// This is the catalogue entry returned by `list()`; the handler that runs
/// the tool is attached separately when the tool is registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique dotted name (e.g., "k8s.describe")
    pub name: String,
    /// Toolset that provides this tool (e.g., "k8s")
    pub toolset: String,
    /// Human-readable description
    pub description: String,
    /// Safety classification
    pub safety: SafetyLevel,
    /// Advisory input shape; not validated centrally
    pub parameters: Vec<ToolParameter>,
}

/// Parameter specification for a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,
    /// Parameter description
    pub description: String,
    /// Whether this parameter is required
    pub required: bool,
    /// Parameter type hint (e.g., "string", "integer", "boolean")
    pub param_type: String,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        toolset: impl Into<String>,
        description: impl Into<String>,
        safety: SafetyLevel,
    ) -> Self {
        Self {
            name: name.into(),
            toolset: toolset.into(),
            description: description.into(),
            safety,
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    /// Declares the `confirm` parameter for tools that need it.
    pub fn with_confirm_parameter(self) -> Self {
        self.with_parameter(
            ToolParameter::new(CONFIRM_ARG, "Must be true to perform this action", true)
                .with_type("boolean"),
        )
    }

    pub fn requires_confirmation(&self) -> bool {
        self.safety.requires_confirmation()
    }
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: "string".to_string(),
        }
    }

    pub fn with_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = param_type.into();
        self
    }
}

/// A call to a tool with arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to call
    pub tool_name: String,
    /// Arguments passed to the tool
    #[serde(default)]
    pub arguments: ToolArguments,
}

impl ToolCall {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments: ToolArguments::new(),
        }
    }

    pub fn with_arguments(mut self, arguments: ToolArguments) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Adds `confirm: true`
    pub fn confirmed(self) -> Self {
        self.with_arg(CONFIRM_ARG, true)
    }

    /// Whether the arguments carry an affirmative boolean confirmation.
    ///
    /// Only the JSON boolean `true` counts; `"true"` or `1` do not.
    pub fn is_confirmed(&self) -> bool {
        is_confirmed(&self.arguments)
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }
}

/// Whether an argument mapping carries `confirm: true`
pub fn is_confirmed(arguments: &ToolArguments) -> bool {
    matches!(arguments.get(CONFIRM_ARG), Some(Value::Bool(true)))
}
