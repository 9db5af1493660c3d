//! Flow configuration from TOML (`[flow]` and `[flow.tools]` sections)

use kube_flow_application::config::{FlowParams, FlowToolNames};
use kube_flow_domain::DEFAULT_MAX_STEPS;
use serde::{Deserialize, Serialize};

/// Raw flow planner configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileFlowConfig {
    /// Step cap when a request gives none
    pub default_max_steps: usize,
    /// Tool names the planner calls
    pub tools: FlowToolNames,
}

impl Default for FileFlowConfig {
    fn default() -> Self {
        Self {
            default_max_steps: DEFAULT_MAX_STEPS,
            tools: FlowToolNames::default(),
        }
    }
}

impl FileFlowConfig {
    pub fn to_params(&self) -> FlowParams {
        FlowParams::default()
            .with_default_max_steps(self.default_max_steps)
            .with_tools(self.tools.clone())
    }

    /// Every configured tool name with the key it was set under
    pub(super) fn tool_entries(&self) -> Vec<(&'static str, &str)> {
        let tools = &self.tools;
        vec![
            ("graph", tools.graph.as_str()),
            ("describe", tools.describe.as_str()),
            ("network", tools.network.as_str()),
            ("scheduling", tools.scheduling.as_str()),
            ("crashloop", tools.crashloop.as_str()),
            ("storage", tools.storage.as_str()),
            ("config_references", tools.config_references.as_str()),
            ("hpa", tools.hpa.as_str()),
            ("vpa", tools.vpa.as_str()),
            ("resource_usage", tools.resource_usage.as_str()),
            ("istio", tools.istio.as_str()),
            ("linkerd", tools.linkerd.as_str()),
            ("cilium", tools.cilium.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_section_deserialize() {
        let toml_str = r#"
[flow]
default_max_steps = 8

[flow.tools]
describe = "inventory.describe"
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let params = config.flow.to_params();
        assert_eq!(params.default_max_steps, 8);
        assert_eq!(params.tools.describe, "inventory.describe");
        assert_eq!(params.tools.graph, "k8s.graph");
    }
}
