//! Neighbor queries over a [`ResourceGraph`].
//!
//! Every query deduplicates by node id and returns nodes in discovery order:
//! origins in the order given, neighbors in sorted adjacency order. Neighbors
//! that are referenced by an edge but absent from the node set are skipped.

use super::entities::{Adjacent, Direction, GraphNode, ResourceGraph, node_id, relation};
use std::collections::{HashSet, VecDeque};

/// Collects nodes once each, in the order first seen.
struct Discovered<'g> {
    seen: HashSet<&'g str>,
    nodes: Vec<&'g GraphNode>,
}

impl<'g> Discovered<'g> {
    fn new() -> Self {
        Self {
            seen: HashSet::new(),
            nodes: Vec::new(),
        }
    }

    fn push(&mut self, node: &'g GraphNode) -> bool {
        if self.seen.insert(node.id.as_str()) {
            self.nodes.push(node);
            true
        } else {
            false
        }
    }

    fn into_vec(self) -> Vec<&'g GraphNode> {
        self.nodes
    }
}

impl ResourceGraph {
    /// Resolve a caller-supplied resource to a node.
    ///
    /// Tries the id convention first, then a case-insensitive
    /// kind/namespace/name match, then name within the namespace, then name
    /// alone.
    pub fn resolve_entry(&self, kind: &str, namespace: &str, name: &str) -> Option<&GraphNode> {
        if let Some(node) = self.node(&node_id(kind, namespace, name)) {
            return Some(node);
        }
        let nodes = self.nodes();
        nodes
            .iter()
            .find(|n| n.is_kind(kind) && n.namespace == namespace && n.name == name)
            .or_else(|| nodes.iter().find(|n| n.namespace == namespace && n.name == name))
            .or_else(|| nodes.iter().find(|n| n.name == name))
    }

    /// Nodes adjacent (either direction, any relation) to any origin that
    /// satisfy `keep`.
    pub fn neighbors_where<'g, F>(&'g self, origins: &[&GraphNode], mut keep: F) -> Vec<&'g GraphNode>
    where
        F: FnMut(&Adjacent, &GraphNode) -> bool,
    {
        let mut found = Discovered::new();
        for origin in origins {
            for adj in self.adjacent(&origin.id) {
                if let Some(node) = self.node(&adj.node_id)
                    && keep(adj, node)
                {
                    found.push(node);
                }
            }
        }
        found.into_vec()
    }

    /// Nodes of `kind` adjacent to any origin
    pub fn neighbors_of_kind<'g>(&'g self, origins: &[&GraphNode], kind: &str) -> Vec<&'g GraphNode> {
        self.neighbors_where(origins, |_, node| node.is_kind(kind))
    }

    /// Every pod in the graph, in payload order
    pub fn pods(&self) -> Vec<&GraphNode> {
        self.nodes().iter().filter(|n| n.is_pod()).collect()
    }

    /// Pods behind the given services, either directly adjacent or one
    /// endpoints-like hop away.
    pub fn backend_pods<'g>(&'g self, services: &[&GraphNode]) -> Vec<&'g GraphNode> {
        let mut found = Discovered::new();
        for service in services {
            for adj in self.adjacent(&service.id) {
                let Some(node) = self.node(&adj.node_id) else {
                    continue;
                };
                if node.is_pod() {
                    found.push(node);
                } else if node.is_endpoints() {
                    for pod in self.neighbors_where(&[node], |_, n| n.is_pod()) {
                        found.push(pod);
                    }
                }
            }
        }
        found.into_vec()
    }

    /// Services related to `entry`: the entry itself when it is a service,
    /// otherwise services adjacent to the entry or to its pods, directly or
    /// through an endpoints-like hop.
    pub fn related_services<'g>(&'g self, entry: &GraphNode) -> Vec<&'g GraphNode> {
        if entry.is_service() {
            return self.node(&entry.id).into_iter().collect();
        }

        let mut origins: Vec<&GraphNode> = vec![entry];
        if entry.is_workload() {
            origins.extend(self.owned_pods(entry));
        }

        let mut found = Discovered::new();
        for origin in &origins {
            for adj in self.adjacent(&origin.id) {
                let Some(node) = self.node(&adj.node_id) else {
                    continue;
                };
                if node.is_service() {
                    found.push(node);
                } else if node.is_endpoints() {
                    for service in self.neighbors_where(&[node], |_, n| n.is_service()) {
                        found.push(service);
                    }
                }
            }
        }
        found.into_vec()
    }

    /// Owners of the given pods, following outgoing `owned-by` edges
    /// transitively (pod → replica set → deployment).
    pub fn owners<'g>(&'g self, pods: &[&GraphNode]) -> Vec<&'g GraphNode> {
        self.walk_owned_by(pods, Direction::Outgoing, |_| true)
    }

    /// Pods owned, transitively, by `workload`
    pub fn owned_pods<'g>(&'g self, workload: &GraphNode) -> Vec<&'g GraphNode> {
        self.walk_owned_by(&[workload], Direction::Incoming, GraphNode::is_pod)
    }

    /// Policy-like nodes attached to the given pods by `blocks` or `selects`
    /// edges, in either direction.
    pub fn related_policies<'g>(&'g self, pods: &[&GraphNode]) -> Vec<&'g GraphNode> {
        self.neighbors_where(pods, |adj, node| {
            let policy_edge = adj.relation.eq_ignore_ascii_case(relation::BLOCKS)
                || adj.relation.eq_ignore_ascii_case(relation::SELECTS);
            policy_edge
                && !node.is_pod()
                && !node.is_service()
                && !node.is_endpoints()
                && !node.is_workload()
        })
    }

    fn walk_owned_by<'g>(
        &'g self,
        origins: &[&GraphNode],
        direction: Direction,
        keep: fn(&GraphNode) -> bool,
    ) -> Vec<&'g GraphNode> {
        let mut visited: HashSet<&str> = origins.iter().map(|n| n.id.as_str()).collect();
        let mut queue: VecDeque<&str> = origins.iter().map(|n| n.id.as_str()).collect();
        let mut found = Discovered::new();

        while let Some(current) = queue.pop_front() {
            for adj in self.adjacent(current) {
                if adj.direction != direction || !adj.relation.eq_ignore_ascii_case(relation::OWNED_BY) {
                    continue;
                }
                let Some(node) = self.node(&adj.node_id) else {
                    continue;
                };
                if visited.insert(node.id.as_str()) {
                    queue.push_back(node.id.as_str());
                    if keep(node) {
                        found.push(node);
                    }
                }
            }
        }
        found.into_vec()
    }
}
