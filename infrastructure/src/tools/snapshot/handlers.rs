//! Handlers of the snapshot toolset

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use kube_flow_application::ports::tool_handler::{ToolHandler, ToolRequest};
use kube_flow_domain::{Identity, ToolError, ToolResult};
use serde_json::{Map, Value, json};

use super::Snapshot;

fn node_str<'a>(node: &'a Map<String, Value>, key: &str) -> &'a str {
    node.get(key).and_then(Value::as_str).unwrap_or("")
}

/// The graph restricted to what the identity may see.
///
/// Namespace identities only get nodes in their allowed namespaces and the
/// edges between them; the number of withheld nodes is added as a warning.
fn visible_graph(graph: &Value, identity: &Identity) -> Value {
    let Some(visible) = identity.visible_namespaces() else {
        return graph.clone();
    };
    let Some(nodes) = graph.get("nodes").and_then(Value::as_array) else {
        return graph.clone();
    };

    let mut kept_ids = HashSet::new();
    let mut kept = Vec::new();
    for node in nodes {
        let namespace = node.get("namespace").and_then(Value::as_str).unwrap_or("");
        if visible.contains(&namespace) {
            if let Some(id) = node.get("id").and_then(Value::as_str) {
                kept_ids.insert(id.to_string());
            }
            kept.push(node.clone());
        }
    }
    let withheld = nodes.len() - kept.len();

    let edges: Vec<Value> = graph
        .get("edges")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|edge| {
            let end = |key: &str| edge.get(key).and_then(Value::as_str).unwrap_or("");
            kept_ids.contains(end("from")) && kept_ids.contains(end("to"))
        })
        .cloned()
        .collect();

    let mut warnings: Vec<Value> = graph
        .get("warnings")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    if withheld > 0 {
        warnings.push(Value::from(format!(
            "{} nodes outside the caller's namespaces were withheld",
            withheld
        )));
    }

    json!({"nodes": kept, "edges": edges, "warnings": warnings})
}

/// Serves the recorded graph
pub(super) struct GraphHandler {
    snapshot: Arc<Snapshot>,
}

impl GraphHandler {
    pub(super) fn new(snapshot: Arc<Snapshot>) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl ToolHandler for GraphHandler {
    async fn execute(&self, request: ToolRequest) -> Result<ToolResult, ToolError> {
        let namespace = request.string_or_empty("namespace");
        request.check_namespace(namespace, true)?;

        if !self.snapshot.graph.is_object() {
            return Err(ToolError::execution_failed(
                request.tool_name(),
                "snapshot has no graph",
            ));
        }
        let graph = visible_graph(&self.snapshot.graph, request.identity());
        Ok(ToolResult::new(graph).with_namespace(namespace))
    }
}

/// Describes one recorded resource
pub(super) struct DescribeHandler {
    snapshot: Arc<Snapshot>,
}

impl DescribeHandler {
    pub(super) fn new(snapshot: Arc<Snapshot>) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl ToolHandler for DescribeHandler {
    async fn execute(&self, request: ToolRequest) -> Result<ToolResult, ToolError> {
        let namespace = request.string_or_empty("namespace");
        let kind = request.require_string("kind")?;
        let name = request.require_string("name")?;
        request.check_namespace(namespace, !namespace.is_empty())?;

        let node = self
            .snapshot
            .find_node(kind, namespace, name)
            .ok_or_else(|| {
                ToolError::execution_failed(
                    request.tool_name(),
                    format!("{} {}/{} is not in the snapshot", kind, namespace, name),
                )
            })?;
        let id = node_str(node, "id");
        let details = self
            .snapshot
            .finding(request.tool_name())
            .and_then(|by_id| by_id.get(id))
            .cloned()
            .unwrap_or(Value::Null);

        Ok(ToolResult::new(json!({"resource": node, "details": details}))
            .with_namespace(namespace)
            .with_resource(id))
    }
}

/// Returns recorded findings of one diagnostic tool
pub(super) struct DiagnosticHandler {
    snapshot: Arc<Snapshot>,
}

impl DiagnosticHandler {
    pub(super) fn new(snapshot: Arc<Snapshot>) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl ToolHandler for DiagnosticHandler {
    async fn execute(&self, request: ToolRequest) -> Result<ToolResult, ToolError> {
        let namespace = request.string_or_empty("namespace");
        request.check_namespace(namespace, true)?;

        let findings = self
            .snapshot
            .finding(request.tool_name())
            .cloned()
            .unwrap_or_else(|| json!([]));
        Ok(
            ToolResult::new(json!({"namespace": namespace, "findings": findings}))
                .with_namespace(namespace),
        )
    }
}

/// Reports what a delete would remove. Snapshots are never modified.
pub(super) struct DeleteHandler {
    snapshot: Arc<Snapshot>,
}

impl DeleteHandler {
    pub(super) fn new(snapshot: Arc<Snapshot>) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl ToolHandler for DeleteHandler {
    async fn execute(&self, request: ToolRequest) -> Result<ToolResult, ToolError> {
        let namespace = request.string_or_empty("namespace");
        let kind = request.require_string("kind")?;
        let name = request.require_string("name")?;
        request.check_namespace(namespace, !namespace.is_empty())?;

        let node = self
            .snapshot
            .find_node(kind, namespace, name)
            .ok_or_else(|| {
                ToolError::execution_failed(
                    request.tool_name(),
                    format!("{} {}/{} is not in the snapshot", kind, namespace, name),
                )
            })?;
        let id = node_str(node, "id");
        tracing::info!(resource = id, "Snapshot delete requested; nothing removed");

        Ok(ToolResult::new(json!({
            "resource": id,
            "deleted": false,
            "dryRun": true,
        }))
        .with_namespace(namespace)
        .with_resource(id))
    }
}

#[cfg(test)]
mod tests {
    use super::super::SnapshotToolset;
    use super::super::tests::shop_snapshot;
    use crate::tools::{Invoker, ToolRegistry};
    use kube_flow_application::config::FlowToolNames;
    use kube_flow_application::ports::tool_invoker::ToolInvoker;
    use kube_flow_domain::{Identity, ToolCall, ToolError, ToolResult};
    use serde_json::json;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    fn invoker() -> Invoker {
        let registry = Arc::new(ToolRegistry::new());
        registry
            .register_toolset(&SnapshotToolset::new(shop_snapshot(), FlowToolNames::default()))
            .unwrap();
        Invoker::new(registry)
    }

    async fn call(identity: Identity, call: ToolCall) -> Result<ToolResult, ToolError> {
        invoker()
            .call(call, Arc::new(identity), CancellationToken::new())
            .await
    }

    #[tokio::test]
    async fn test_graph_for_cluster_identity_is_complete() {
        let result = call(Identity::cluster(), ToolCall::new("k8s.graph").with_arg("namespace", "shop"))
            .await
            .unwrap();
        assert_eq!(result.payload, shop_snapshot().graph);
    }

    #[tokio::test]
    async fn test_graph_is_filtered_for_namespace_identity() {
        let result = call(
            Identity::namespaced(["shop"]),
            ToolCall::new("k8s.graph").with_arg("namespace", "shop"),
        )
        .await
        .unwrap();

        let nodes = result.payload["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 2);
        // the edge to the cluster-scoped node is gone too
        assert_eq!(result.payload["edges"].as_array().unwrap().len(), 1);
        let warnings = result.payload["warnings"].as_array().unwrap();
        assert_eq!(warnings[0], json!("recorded without metrics"));
        assert_eq!(warnings[1], json!("2 nodes outside the caller's namespaces were withheld"));
    }

    #[tokio::test]
    async fn test_handlers_check_namespace() {
        let identity = || Identity::namespaced(["shop"]);

        let err = call(identity(), ToolCall::new("k8s.graph").with_arg("namespace", "billing"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");

        let err = call(
            identity(),
            ToolCall::new("k8s.describe")
                .with_arg("kind", "Node")
                .with_arg("name", "worker-1"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");

        let err = call(
            identity(),
            ToolCall::new("network.diagnose_service").with_arg("namespace", "billing"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_describe_returns_recorded_details() {
        let result = call(
            Identity::cluster(),
            ToolCall::new("k8s.describe")
                .with_arg("namespace", "shop")
                .with_arg("kind", "Pod")
                .with_arg("name", "checkout-7d"),
        )
        .await
        .unwrap();
        assert_eq!(result.payload["details"]["restarts"], json!(4));
        assert_eq!(result.metadata.resources, vec!["Pod/shop/checkout-7d"]);

        let err = call(
            Identity::cluster(),
            ToolCall::new("k8s.describe")
                .with_arg("namespace", "shop")
                .with_arg("kind", "Pod"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn test_diagnostics_default_to_no_findings() {
        let recorded = call(
            Identity::cluster(),
            ToolCall::new("network.diagnose_service").with_arg("namespace", "shop"),
        )
        .await
        .unwrap();
        assert_eq!(recorded.payload["findings"][0]["message"], json!("no ready endpoints"));

        let empty = call(
            Identity::cluster(),
            ToolCall::new("storage.diagnose_pod").with_arg("namespace", "shop"),
        )
        .await
        .unwrap();
        assert_eq!(empty.payload["findings"], json!([]));
    }

    #[tokio::test]
    async fn test_delete_needs_confirmation_and_changes_nothing() {
        let delete = || {
            ToolCall::new("k8s.delete")
                .with_arg("namespace", "shop")
                .with_arg("kind", "Pod")
                .with_arg("name", "checkout-7d")
        };

        let err = call(Identity::cluster(), delete()).await.unwrap_err();
        assert_eq!(err.code(), "CONFIRMATION_REQUIRED");

        let result = call(Identity::cluster(), delete().confirmed()).await.unwrap();
        assert_eq!(result.payload["deleted"], json!(false));
        assert_eq!(result.payload["resource"], json!("Pod/shop/checkout-7d"));
    }
}
