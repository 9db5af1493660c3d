//! Diagnostic scenarios

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// The closed set of diagnostic intents a flow can follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// Requests do not reach the workload
    Traffic,
    /// Pods stay unscheduled
    Pending,
    /// Containers restart repeatedly
    Crashloop,
    /// Autoscalers do not react as expected
    Autoscaling,
    /// Network policies block traffic
    NetworkPolicy,
    /// Service mesh misbehaves
    Mesh,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported scenario '{0}' (expected one of: traffic, pending, crashloop, autoscaling, networkpolicy, mesh)")]
pub struct UnknownScenario(pub String);

impl Scenario {
    pub const ALL: [Scenario; 6] = [
        Scenario::Traffic,
        Scenario::Pending,
        Scenario::Crashloop,
        Scenario::Autoscaling,
        Scenario::NetworkPolicy,
        Scenario::Mesh,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Traffic => "traffic",
            Scenario::Pending => "pending",
            Scenario::Crashloop => "crashloop",
            Scenario::Autoscaling => "autoscaling",
            Scenario::NetworkPolicy => "networkpolicy",
            Scenario::Mesh => "mesh",
        }
    }
}

impl FromStr for Scenario {
    type Err = UnknownScenario;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.as_str() == normalized)
            .ok_or_else(|| UnknownScenario(s.to_string()))
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
