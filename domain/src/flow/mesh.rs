//! Service mesh detection from graph markers

use crate::graph::{GraphNode, ResourceGraph};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshKind {
    Istio,
    Linkerd,
    Cilium,
}

struct Markers {
    kinds: &'static [&'static str],
    namespaces: &'static [&'static str],
    name_prefixes: &'static [&'static str],
}

const ISTIO: Markers = Markers {
    kinds: &[
        "VirtualService",
        "DestinationRule",
        "ServiceEntry",
        "PeerAuthentication",
        "AuthorizationPolicy",
        "Sidecar",
    ],
    namespaces: &["istio-system"],
    name_prefixes: &["istiod", "istio-"],
};

const LINKERD: Markers = Markers {
    kinds: &["ServiceProfile", "Server", "ServerAuthorization"],
    namespaces: &["linkerd"],
    name_prefixes: &["linkerd-"],
};

const CILIUM: Markers = Markers {
    kinds: &[
        "CiliumNetworkPolicy",
        "CiliumClusterwideNetworkPolicy",
        "CiliumEndpoint",
    ],
    namespaces: &[],
    name_prefixes: &["cilium"],
};

impl MeshKind {
    /// Probe order; every mesh is probed independently
    pub const ALL: [MeshKind; 3] = [MeshKind::Istio, MeshKind::Linkerd, MeshKind::Cilium];

    pub fn as_str(&self) -> &'static str {
        match self {
            MeshKind::Istio => "istio",
            MeshKind::Linkerd => "linkerd",
            MeshKind::Cilium => "cilium",
        }
    }

    fn markers(&self) -> &'static Markers {
        match self {
            MeshKind::Istio => &ISTIO,
            MeshKind::Linkerd => &LINKERD,
            MeshKind::Cilium => &CILIUM,
        }
    }

    pub fn matches(&self, node: &GraphNode) -> bool {
        let markers = self.markers();
        markers.kinds.iter().any(|k| node.is_kind(k))
            || markers.namespaces.iter().any(|ns| node.namespace == *ns)
            || markers
                .name_prefixes
                .iter()
                .any(|prefix| node.name.to_ascii_lowercase().starts_with(prefix))
    }

    /// First node in the graph carrying one of this mesh's markers
    pub fn find_marker<'g>(&self, graph: &'g ResourceGraph) -> Option<&'g GraphNode> {
        graph.nodes().iter().find(|node| self.matches(node))
    }
}

impl std::fmt::Display for MeshKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
