//! Policy configuration from TOML (`[policy]` section)

use kube_flow_domain::ToolPolicy;
use serde::{Deserialize, Serialize};

/// Raw policy configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePolicyConfig {
    /// Only read-only tools may run
    pub read_only: bool,
    /// Destructive tools never run, even when confirmed
    pub disable_destructive: bool,
}

impl FilePolicyConfig {
    pub fn to_policy(&self) -> ToolPolicy {
        ToolPolicy::default()
            .with_read_only(self.read_only)
            .with_disable_destructive(self.disable_destructive)
    }
}
