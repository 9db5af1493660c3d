//! Graph payload parsing.
//!
//! The payload comes from another tool and is untyped at the boundary:
//!
//! ```json
//! {
//!   "nodes": [{"id": "...", "kind": "...", "name": "...", "namespace": "..."}],
//!   "edges": [{"from": "...", "to": "...", "relation": "..."}],
//!   "warnings": ["..."]
//! }
//! ```
//!
//! Only a missing `nodes` list is fatal. Malformed entries are skipped and
//! reported as warnings on the graph; a node without an id is skipped
//! without a warning.

use super::entities::{GraphEdge, GraphNode, ResourceGraph};
use crate::tool::ToolError;
use serde_json::Value;
use tracing::{debug, warn};

const SOURCE: &str = "graph";

pub fn parse_graph(payload: &Value) -> Result<ResourceGraph, ToolError> {
    let root = payload
        .as_object()
        .ok_or_else(|| ToolError::invalid_payload(SOURCE, "payload is not an object"))?;

    let nodes = root
        .get("nodes")
        .ok_or_else(|| ToolError::invalid_payload(SOURCE, "payload has no \"nodes\" entry"))?
        .as_array()
        .ok_or_else(|| ToolError::invalid_payload(SOURCE, "\"nodes\" is not a list"))?;

    let mut graph = ResourceGraph::new();

    if let Some(warnings) = root.get("warnings").and_then(Value::as_array) {
        for warning in warnings.iter().filter_map(Value::as_str) {
            graph.push_warning(warning);
        }
    }

    for (index, entry) in nodes.iter().enumerate() {
        match parse_node(entry) {
            NodeEntry::Node(node) => {
                let id = node.id.clone();
                if !graph.add_node(node) {
                    graph.push_warning(format!("duplicate node id '{}' ignored", id));
                }
            }
            NodeEntry::MissingId => {
                debug!(index, "dropping graph node without id");
            }
            NodeEntry::Malformed(reason) => {
                warn!(index, reason = %reason, "dropping malformed graph node");
                graph.push_warning(format!("node #{} dropped: {}", index, reason));
            }
        }
    }

    match root.get("edges") {
        None | Some(Value::Null) => {}
        Some(Value::Array(edges)) => {
            for (index, entry) in edges.iter().enumerate() {
                match parse_edge(entry) {
                    Ok(edge) => graph.add_edge(edge),
                    Err(reason) => {
                        warn!(index, reason = %reason, "dropping malformed graph edge");
                        graph.push_warning(format!("edge #{} dropped: {}", index, reason));
                    }
                }
            }
        }
        Some(_) => graph.push_warning("\"edges\" is not a list; edges ignored"),
    }

    debug!(
        nodes = graph.nodes().len(),
        edges = graph.edges().len(),
        warnings = graph.warnings().len(),
        "parsed resource graph"
    );

    Ok(graph)
}

enum NodeEntry {
    Node(GraphNode),
    MissingId,
    Malformed(String),
}

fn parse_node(entry: &Value) -> NodeEntry {
    let Some(object) = entry.as_object() else {
        return NodeEntry::Malformed("not an object".to_string());
    };

    let id = match object.get("id") {
        None | Some(Value::Null) => return NodeEntry::MissingId,
        Some(Value::String(id)) if id.is_empty() => return NodeEntry::MissingId,
        Some(Value::String(id)) => id.clone(),
        Some(_) => return NodeEntry::Malformed("\"id\" is not a string".to_string()),
    };

    let kind = match required_string(object, "kind") {
        Ok(kind) => kind,
        Err(reason) => return NodeEntry::Malformed(reason),
    };
    let name = match required_string(object, "name") {
        Ok(name) => name,
        Err(reason) => return NodeEntry::Malformed(reason),
    };
    let namespace = match object.get("namespace") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(ns)) => ns.clone(),
        Some(_) => return NodeEntry::Malformed("\"namespace\" is not a string".to_string()),
    };

    NodeEntry::Node(GraphNode {
        id,
        kind,
        name,
        namespace,
    })
}

fn parse_edge(entry: &Value) -> Result<GraphEdge, String> {
    let object = entry.as_object().ok_or_else(|| "not an object".to_string())?;
    let from = required_string(object, "from")?;
    let to = required_string(object, "to")?;
    let relation = match object.get("relation") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(relation)) => relation.clone(),
        Some(_) => return Err("\"relation\" is not a string".to_string()),
    };
    Ok(GraphEdge { from, to, relation })
}

fn required_string(object: &serde_json::Map<String, Value>, key: &str) -> Result<String, String> {
    match object.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::String(_)) | None | Some(Value::Null) => Err(format!("missing \"{}\"", key)),
        Some(_) => Err(format!("\"{}\" is not a string", key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_nodes_is_invalid_payload() {
        let err = parse_graph(&json!({"edges": []})).unwrap_err();
        assert_eq!(err.code(), "INVALID_PAYLOAD");

        let err = parse_graph(&json!(["not", "a", "map"])).unwrap_err();
        assert_eq!(err.code(), "INVALID_PAYLOAD");

        let err = parse_graph(&json!({"nodes": "nope"})).unwrap_err();
        assert_eq!(err.code(), "INVALID_PAYLOAD");
    }

    #[test]
    fn test_one_malformed_node_is_dropped() {
        let payload = json!({
            "nodes": [
                {"id": "Pod/shop/a", "kind": "Pod", "name": "a", "namespace": "shop"},
                {"id": 42, "kind": "Pod", "name": "b"},
                {"id": "Pod/shop/c", "kind": "Pod", "name": "c", "namespace": "shop"}
            ]
        });

        let graph = parse_graph(&payload).unwrap();
        assert_eq!(graph.nodes().len(), 2);
        assert_eq!(graph.nodes()[0].name, "a");
        assert_eq!(graph.nodes()[1].name, "c");
        assert_eq!(graph.warnings().len(), 1);
        assert!(graph.warnings()[0].contains("node #1"));
    }

    #[test]
    fn test_node_without_id_dropped_silently() {
        let payload = json!({
            "nodes": [
                {"kind": "Pod", "name": "anonymous"},
                {"id": "Node/worker-1", "kind": "Node", "name": "worker-1"}
            ]
        });

        let graph = parse_graph(&payload).unwrap();
        assert_eq!(graph.nodes().len(), 1);
        assert!(graph.warnings().is_empty());
        assert_eq!(graph.nodes()[0].namespace, "");
    }

    #[test]
    fn test_edges_partial_and_dangling() {
        let payload = json!({
            "nodes": [{"id": "Service/shop/s", "kind": "Service", "name": "s", "namespace": "shop"}],
            "edges": [
                {"from": "Service/shop/s", "to": "Pod/shop/gone", "relation": "targets"},
                {"from": "Service/shop/s"},
                "garbage"
            ],
            "warnings": ["collector truncated output", 7]
        });

        let graph = parse_graph(&payload).unwrap();
        assert_eq!(graph.edges().len(), 1);
        assert!(!graph.contains("Pod/shop/gone"));
        assert_eq!(graph.warnings()[0], "collector truncated output");
        assert_eq!(graph.warnings().len(), 3);
    }

    #[test]
    fn test_edges_optional() {
        let graph = parse_graph(&json!({"nodes": []})).unwrap();
        assert!(graph.nodes().is_empty());
        assert!(graph.edges().is_empty());
    }
}
