//! Flow entities: the explainable record of a diagnostic run

use super::scenario::Scenario;
use crate::graph::GraphNode;
use crate::tool::{ToolArguments, ToolError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Step cap used when the caller gives none (or a non-positive one)
pub const DEFAULT_MAX_STEPS: usize = 20;

/// Error recorded on a step whose tool call failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepError {
    pub code: String,
    pub message: String,
}

impl From<&ToolError> for StepError {
    fn from(error: &ToolError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

/// One step of a flow. Created once, appended, never changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowStep {
    /// 1-based position in the flow
    pub ordinal: usize,
    /// Resource this step is about
    pub subject: GraphNode,
    /// Tool invoked; `None` for annotation-only steps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default)]
    pub arguments: ToolArguments,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StepError>,
    /// Why this step is part of the flow
    pub notes: String,
}

impl FlowStep {
    pub fn is_annotation(&self) -> bool {
        self.tool.is_none()
    }

    pub fn succeeded(&self) -> bool {
        self.tool.is_some() && self.error.is_none()
    }

    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// The resource the flow is anchored at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEntry {
    pub namespace: String,
    pub kind: String,
    pub name: String,
    /// Graph node the entry resolved to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

/// Outcome of a flow run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowResult {
    pub entry: FlowEntry,
    pub scenario: Scenario,
    /// Graph payload as received, for caller-side rendering
    pub graph: Value,
    pub steps: Vec<FlowStep>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl FlowResult {
    pub fn failed_steps(&self) -> impl Iterator<Item = &FlowStep> {
        self.steps.iter().filter(|s| s.failed())
    }

    pub fn completed_steps(&self) -> impl Iterator<Item = &FlowStep> {
        self.steps.iter().filter(|s| !s.failed())
    }
}
