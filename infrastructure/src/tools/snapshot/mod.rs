//! Snapshot toolset
//!
//! Serves the graph, describe and diagnostic tools the flow planner calls
//! from a recorded JSON snapshot instead of a live cluster:
//!
//! ```json
//! {
//!   "graph": {"nodes": [...], "edges": [...]},
//!   "findings": {
//!     "network.diagnose_service": [{"severity": "warning", "message": "..."}],
//!     "k8s.describe": {"Pod/shop/checkout-7d": {"phase": "Running"}}
//!   }
//! }
//! ```
//!
//! Diagnostic tools return their `findings` entry (an empty list when there
//! is none). `k8s.describe` returns the graph node plus its entry under
//! `findings["k8s.describe"]`. Every handler checks namespace access first.

mod handlers;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use kube_flow_application::config::FlowToolNames;
use kube_flow_application::ports::tool_handler::ToolSpec;
use kube_flow_application::ports::toolset::ToolsetProvider;
use kube_flow_domain::{SafetyLevel, ToolDefinition, ToolParameter};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use handlers::{DeleteHandler, DescribeHandler, DiagnosticHandler, GraphHandler};

/// Name of the destructive tool the snapshot toolset provides
pub const DELETE_TOOL: &str = "k8s.delete";

/// Errors loading a snapshot file
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Recorded cluster state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    /// Graph payload, served as-is by the graph tool
    pub graph: Value,
    /// Per-tool findings
    pub findings: BTreeMap<String, Value>,
}

impl Snapshot {
    pub fn from_file(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| SnapshotError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Graph nodes as raw JSON objects
    fn nodes(&self) -> impl Iterator<Item = &serde_json::Map<String, Value>> {
        self.graph
            .get("nodes")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
    }

    /// The node matching kind (case-insensitive), namespace and name
    fn find_node(&self, kind: &str, namespace: &str, name: &str) -> Option<&serde_json::Map<String, Value>> {
        let field = |node: &serde_json::Map<String, Value>, key: &str| -> String {
            node.get(key).and_then(Value::as_str).unwrap_or("").to_string()
        };
        self.nodes().find(|node| {
            field(node, "kind").eq_ignore_ascii_case(kind)
                && field(node, "namespace") == namespace
                && field(node, "name") == name
        })
    }

    fn finding(&self, tool: &str) -> Option<&Value> {
        self.findings.get(tool)
    }
}

/// Toolset backed by a [`Snapshot`]
pub struct SnapshotToolset {
    snapshot: Arc<Snapshot>,
    names: FlowToolNames,
}

impl SnapshotToolset {
    pub fn new(snapshot: Snapshot, names: FlowToolNames) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
            names,
        }
    }
}

impl ToolsetProvider for SnapshotToolset {
    fn id(&self) -> &str {
        "snapshot"
    }

    fn tools(&self) -> Vec<ToolSpec> {
        let snapshot = &self.snapshot;
        let mut specs = vec![
            ToolSpec::new(
                resource_definition(
                    &self.names.graph,
                    "Resource graph around a resource, as recorded in the snapshot",
                    SafetyLevel::ReadOnly,
                    false,
                ),
                GraphHandler::new(Arc::clone(snapshot)),
            ),
            ToolSpec::new(
                resource_definition(
                    &self.names.describe,
                    "Describe a resource recorded in the snapshot",
                    SafetyLevel::ReadOnly,
                    true,
                ),
                DescribeHandler::new(Arc::clone(snapshot)),
            ),
            ToolSpec::new(
                resource_definition(
                    DELETE_TOOL,
                    "Delete a resource (the snapshot only reports what would be deleted)",
                    SafetyLevel::Destructive,
                    true,
                )
                .with_confirm_parameter(),
                DeleteHandler::new(Arc::clone(snapshot)),
            ),
        ];

        // several roles may share one tool name
        let mut seen: BTreeSet<String> = specs.iter().map(|s| s.name().to_string()).collect();
        for name in self.names.diagnostics() {
            if !seen.insert(name.to_string()) {
                continue;
            }
            specs.push(ToolSpec::new(
                ToolDefinition::new(
                    name,
                    self.id(),
                    "Recorded diagnostic findings",
                    SafetyLevel::ReadOnly,
                )
                .with_parameter(ToolParameter::new("namespace", "Namespace to diagnose", true)),
                DiagnosticHandler::new(Arc::clone(snapshot)),
            ));
        }
        specs
    }
}

fn resource_definition(
    name: &str,
    description: &str,
    safety: SafetyLevel,
    require_name: bool,
) -> ToolDefinition {
    ToolDefinition::new(name, "snapshot", description, safety)
        .with_parameter(ToolParameter::new(
            "namespace",
            "Namespace of the resource; empty for cluster-scoped resources",
            false,
        ))
        .with_parameter(ToolParameter::new("kind", "Resource kind", require_name))
        .with_parameter(ToolParameter::new("name", "Resource name", require_name))
}
