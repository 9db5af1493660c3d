//! Resource graph entities

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Relation labels the traversals understand
pub mod relation {
    pub const OWNED_BY: &str = "owned-by";
    pub const BLOCKS: &str = "blocks";
    pub const SELECTS: &str = "selects";
    pub const EXPOSES: &str = "exposes";
    pub const TARGETS: &str = "targets";
}

/// Resource kinds the traversals understand
pub mod kind {
    pub const POD: &str = "Pod";
    pub const SERVICE: &str = "Service";
    pub const ENDPOINTS: &str = "Endpoints";
    pub const ENDPOINT_SLICE: &str = "EndpointSlice";

    /// Kinds that own pods, directly or through another workload
    pub const WORKLOADS: &[&str] = &[
        "Deployment",
        "ReplicaSet",
        "StatefulSet",
        "DaemonSet",
        "Job",
        "CronJob",
        "ReplicationController",
    ];
}

/// Builds the node id convention: `kind/namespace/name`, or `kind/name` for
/// cluster-scoped resources.
pub fn node_id(kind: &str, namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        format!("{}/{}", kind, name)
    } else {
        format!("{}/{}/{}", kind, namespace, name)
    }
}

/// A resource in the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub kind: String,
    pub name: String,
    /// Empty for cluster-scoped resources
    #[serde(default)]
    pub namespace: String,
}

impl GraphNode {
    /// Node with an id derived from kind, namespace and name
    pub fn new(kind: impl Into<String>, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let kind = kind.into();
        let namespace = namespace.into();
        let name = name.into();
        Self {
            id: node_id(&kind, &namespace, &name),
            kind,
            name,
            namespace,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Case-insensitive kind comparison
    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind.eq_ignore_ascii_case(kind)
    }

    pub fn is_pod(&self) -> bool {
        self.is_kind(kind::POD)
    }

    pub fn is_service(&self) -> bool {
        self.is_kind(kind::SERVICE)
    }

    pub fn is_endpoints(&self) -> bool {
        self.is_kind(kind::ENDPOINTS) || self.is_kind(kind::ENDPOINT_SLICE)
    }

    pub fn is_workload(&self) -> bool {
        kind::WORKLOADS.iter().any(|k| self.is_kind(k))
    }
}

/// A directed relationship between two node ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub relation: String,
}

impl GraphEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, relation: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            relation: relation.into(),
        }
    }

    pub fn is_relation(&self, relation: &str) -> bool {
        self.relation.eq_ignore_ascii_case(relation)
    }
}

/// Which end of an edge the neighbor sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    /// The neighbor is the edge's `to`
    Outgoing,
    /// The neighbor is the edge's `from`
    Incoming,
}

/// One entry of a node's adjacency list
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Adjacent {
    pub node_id: String,
    pub relation: String,
    pub direction: Direction,
}

/// Parsed resource graph.
///
/// Node order follows the payload. Adjacency lists are sorted so that
/// traversals produce the same order whatever order the edges arrived in.
#[derive(Debug, Clone, Default)]
pub struct ResourceGraph {
    nodes: Vec<GraphNode>,
    index: HashMap<String, usize>,
    edges: Vec<GraphEdge>,
    adjacency: BTreeMap<String, Vec<Adjacent>>,
    warnings: Vec<String>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node; a node whose id is already present is ignored.
    pub fn add_node(&mut self, node: GraphNode) -> bool {
        if self.index.contains_key(&node.id) {
            return false;
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    /// Adds an edge. Endpoints need not exist in the node set.
    pub fn add_edge(&mut self, edge: GraphEdge) {
        insert_sorted(
            self.adjacency.entry(edge.from.clone()).or_default(),
            Adjacent {
                node_id: edge.to.clone(),
                relation: edge.relation.clone(),
                direction: Direction::Outgoing,
            },
        );
        insert_sorted(
            self.adjacency.entry(edge.to.clone()).or_default(),
            Adjacent {
                node_id: edge.from.clone(),
                relation: edge.relation.clone(),
                direction: Direction::Incoming,
            },
        );
        self.edges.push(edge);
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Sorted adjacency of a node, including neighbors absent from the node set
    pub fn adjacent(&self, id: &str) -> &[Adjacent] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn insert_sorted(list: &mut Vec<Adjacent>, entry: Adjacent) {
    match list.binary_search(&entry) {
        Ok(_) => {}
        Err(pos) => list.insert(pos, entry),
    }
}
