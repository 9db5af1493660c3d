//! Type definitions for the RunFlow use case.

use kube_flow_domain::{ToolArguments, ToolError};
use serde_json::Value;

/// Tool name the planner is exposed under
pub const FLOW_TOOL: &str = "flow.diagnose";

/// Input for the RunFlow use case
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFlowInput {
    pub namespace: String,
    pub kind: String,
    pub name: String,
    pub scenario: String,
    /// Step cap; `None` or non-positive means the configured default
    pub max_steps: Option<i64>,
}

impl RunFlowInput {
    pub fn new(
        namespace: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
        scenario: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            kind: kind.into(),
            name: name.into(),
            scenario: scenario.into(),
            max_steps: None,
        }
    }

    pub fn with_max_steps(mut self, max_steps: i64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Read the flow tool's arguments.
    ///
    /// Missing strings become empty and are rejected later by validation, so
    /// every missing field is reported the same way. A `maxSteps` that is
    /// present but not an integer is rejected here.
    pub fn from_arguments(arguments: &ToolArguments) -> Result<Self, ToolError> {
        let text = |key: &str| {
            arguments
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string()
        };

        let max_steps = match arguments.get("maxSteps") {
            None | Some(Value::Null) => None,
            Some(value) => Some(value.as_i64().ok_or_else(|| {
                ToolError::invalid_argument(FLOW_TOOL, "maxSteps must be an integer")
            })?),
        };

        Ok(Self {
            namespace: text("namespace"),
            kind: text("kind"),
            name: text("name"),
            scenario: text("scenario"),
            max_steps,
        })
    }

    /// Names of required fields that are empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("namespace", &self.namespace),
            ("kind", &self.kind),
            ("name", &self.name),
            ("scenario", &self.scenario),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> ToolArguments {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_from_arguments() {
        let input = RunFlowInput::from_arguments(&args(json!({
            "namespace": "shop",
            "kind": "Service",
            "name": "checkout",
            "scenario": "traffic",
            "maxSteps": 5
        })))
        .unwrap();

        assert_eq!(input, RunFlowInput::new("shop", "Service", "checkout", "traffic").with_max_steps(5));
        assert!(input.missing_fields().is_empty());
    }

    #[test]
    fn test_missing_fields_reported_together() {
        let input = RunFlowInput::from_arguments(&args(json!({"kind": "Pod", "name": " "}))).unwrap();
        assert_eq!(input.missing_fields(), vec!["namespace", "name", "scenario"]);
        assert_eq!(input.max_steps, None);
    }

    #[test]
    fn test_non_integer_max_steps() {
        let err = RunFlowInput::from_arguments(&args(json!({"maxSteps": "ten"}))).unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENT");
    }
}
