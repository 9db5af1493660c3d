//! Flow parameters: which tools the planner calls and how many steps it
//! may take.

use kube_flow_domain::{DEFAULT_MAX_STEPS, MeshKind};
use serde::{Deserialize, Serialize};

/// Names of the tools the flow planner invokes.
///
/// Defaults follow the built-in toolsets; deployments that register their
/// own toolsets can remap each entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowToolNames {
    /// Produces the resource graph payload
    pub graph: String,
    pub describe: String,
    pub network: String,
    pub scheduling: String,
    pub crashloop: String,
    pub storage: String,
    pub config_references: String,
    pub hpa: String,
    pub vpa: String,
    pub resource_usage: String,
    pub istio: String,
    pub linkerd: String,
    pub cilium: String,
}

impl Default for FlowToolNames {
    fn default() -> Self {
        Self {
            graph: "k8s.graph".to_string(),
            describe: "k8s.describe".to_string(),
            network: "network.diagnose_service".to_string(),
            scheduling: "scheduling.diagnose_pending".to_string(),
            crashloop: "pods.diagnose_crashloop".to_string(),
            storage: "storage.diagnose_pod".to_string(),
            config_references: "config.diagnose_references".to_string(),
            hpa: "autoscaling.diagnose_hpa".to_string(),
            vpa: "autoscaling.diagnose_vpa".to_string(),
            resource_usage: "metrics.resource_usage".to_string(),
            istio: "mesh.istio.diagnose".to_string(),
            linkerd: "mesh.linkerd.diagnose".to_string(),
            cilium: "mesh.cilium.diagnose".to_string(),
        }
    }
}

impl FlowToolNames {
    pub fn mesh(&self, mesh: MeshKind) -> &str {
        match mesh {
            MeshKind::Istio => &self.istio,
            MeshKind::Linkerd => &self.linkerd,
            MeshKind::Cilium => &self.cilium,
        }
    }

    /// Every diagnostic tool name except the graph and describe tools
    pub fn diagnostics(&self) -> Vec<&str> {
        [
            &self.network,
            &self.scheduling,
            &self.crashloop,
            &self.storage,
            &self.config_references,
            &self.hpa,
            &self.vpa,
            &self.resource_usage,
            &self.istio,
            &self.linkerd,
            &self.cilium,
        ]
        .into_iter()
        .map(String::as_str)
        .collect()
    }
}

/// Planner settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowParams {
    /// Step cap when the caller does not pass a positive `maxSteps`
    pub default_max_steps: usize,
    pub tools: FlowToolNames,
}

impl Default for FlowParams {
    fn default() -> Self {
        Self {
            default_max_steps: DEFAULT_MAX_STEPS,
            tools: FlowToolNames::default(),
        }
    }
}

impl FlowParams {
    pub fn with_default_max_steps(mut self, max: usize) -> Self {
        self.default_max_steps = max;
        self
    }

    pub fn with_tools(mut self, tools: FlowToolNames) -> Self {
        self.tools = tools;
        self
    }

    /// Step cap for a request: the requested value when positive, else the
    /// configured default (itself falling back to [`DEFAULT_MAX_STEPS`]).
    pub fn effective_max_steps(&self, requested: Option<i64>) -> usize {
        match requested {
            Some(n) if n > 0 => usize::try_from(n).unwrap_or(usize::MAX),
            _ if self.default_max_steps > 0 => self.default_max_steps,
            _ => DEFAULT_MAX_STEPS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_max_steps() {
        let params = FlowParams::default();
        assert_eq!(params.effective_max_steps(None), 20);
        assert_eq!(params.effective_max_steps(Some(0)), 20);
        assert_eq!(params.effective_max_steps(Some(-3)), 20);
        assert_eq!(params.effective_max_steps(Some(2)), 2);

        let zero_default = FlowParams::default().with_default_max_steps(0);
        assert_eq!(zero_default.effective_max_steps(None), DEFAULT_MAX_STEPS);
    }

    #[test]
    fn test_tool_names_deserialize_partially() {
        let names: FlowToolNames = serde_json::from_value(serde_json::json!({
            "describe": "inventory.describe"
        }))
        .unwrap();
        assert_eq!(names.describe, "inventory.describe");
        assert_eq!(names.graph, "k8s.graph");
        assert_eq!(names.mesh(MeshKind::Linkerd), "mesh.linkerd.diagnose");
        assert_eq!(names.diagnostics().len(), 11);
    }
}
