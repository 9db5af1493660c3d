//! Flow toolset: exposes the diagnostic planner as the `flow.diagnose` tool.
//!
//! The handler builds a [`RunFlowUseCase`] per request from the request's own
//! invoker handle and cancellation token, so every step of the flow goes
//! through the same safety gate as an external call and stops when the
//! outer call is cancelled.

use std::sync::Arc;

use async_trait::async_trait;
use kube_flow_application::config::FlowParams;
use kube_flow_application::ports::tool_handler::{ToolHandler, ToolRequest, ToolSpec};
use kube_flow_application::ports::toolset::ToolsetProvider;
use kube_flow_application::use_cases::run_flow::{FLOW_TOOL, RunFlowInput, RunFlowUseCase};
use kube_flow_domain::{
    SafetyLevel, Scenario, ToolDefinition, ToolError, ToolParameter, ToolResult,
};

/// Provides `flow.diagnose`
pub struct FlowToolset {
    params: FlowParams,
}

impl FlowToolset {
    pub fn new(params: FlowParams) -> Self {
        Self { params }
    }
}

impl ToolsetProvider for FlowToolset {
    fn id(&self) -> &str {
        "flow"
    }

    fn tools(&self) -> Vec<ToolSpec> {
        vec![ToolSpec::new(
            diagnose_definition(),
            DiagnoseHandler {
                params: self.params.clone(),
            },
        )]
    }
}

fn diagnose_definition() -> ToolDefinition {
    let scenarios: Vec<&str> = Scenario::ALL.iter().map(Scenario::as_str).collect();
    ToolDefinition::new(
        FLOW_TOOL,
        "flow",
        "Walk the resource graph around one resource and run the diagnostics of a scenario",
        SafetyLevel::ReadOnly,
    )
    .with_parameter(ToolParameter::new("namespace", "Namespace of the entry resource", true))
    .with_parameter(ToolParameter::new("kind", "Kind of the entry resource", true))
    .with_parameter(ToolParameter::new("name", "Name of the entry resource", true))
    .with_parameter(ToolParameter::new(
        "scenario",
        format!("One of: {}", scenarios.join(", ")),
        true,
    ))
    .with_parameter(
        ToolParameter::new("maxSteps", "Step cap (default 20)", false).with_type("integer"),
    )
}

struct DiagnoseHandler {
    params: FlowParams,
}

#[async_trait]
impl ToolHandler for DiagnoseHandler {
    async fn execute(&self, request: ToolRequest) -> Result<ToolResult, ToolError> {
        let input = RunFlowInput::from_arguments(request.arguments())?;
        let namespace = input.namespace.clone();

        let use_case = RunFlowUseCase::new(Arc::clone(request.invoker()), self.params.clone())
            .with_cancellation(request.cancellation().clone());
        let flow = use_case.execute(input, Arc::clone(request.identity())).await?;

        let node_id = flow.entry.node_id.clone();
        let payload = serde_json::to_value(&flow)
            .map_err(|e| ToolError::execution_failed(FLOW_TOOL, e.to_string()))?;

        let mut result = ToolResult::new(payload).with_namespace(namespace);
        if let Some(node_id) = node_id {
            result = result.with_resource(node_id);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{Invoker, ToolRegistry};
    use kube_flow_application::ports::tool_invoker::ToolInvoker;
    use kube_flow_domain::{Identity, ToolCall};
    use serde_json::{Value, json};
    use tokio_util::sync::CancellationToken;

    struct GraphHandler(Value);

    #[async_trait]
    impl ToolHandler for GraphHandler {
        async fn execute(&self, request: ToolRequest) -> Result<ToolResult, ToolError> {
            request.check_namespace(request.string_or_empty("namespace"), true)?;
            Ok(ToolResult::new(self.0.clone()))
        }
    }

    struct EchoHandler;

    #[async_trait]
    impl ToolHandler for EchoHandler {
        async fn execute(&self, request: ToolRequest) -> Result<ToolResult, ToolError> {
            Ok(ToolResult::new(json!({"echo": request.tool_name()})))
        }
    }

    fn registry() -> Arc<ToolRegistry> {
        let registry = Arc::new(ToolRegistry::new());
        registry.register_toolset(&FlowToolset::new(FlowParams::default())).unwrap();
        registry
            .add(ToolSpec::new(
                ToolDefinition::new("k8s.graph", "k8s", "graph", SafetyLevel::ReadOnly),
                GraphHandler(json!({
                    "nodes": [
                        {"id": "Pod/shop/api-1", "kind": "Pod", "name": "api-1", "namespace": "shop"}
                    ]
                })),
            ))
            .unwrap();
        for name in ["k8s.describe", "storage.diagnose_pod", "scheduling.diagnose_pending"] {
            registry
                .add(ToolSpec::new(
                    ToolDefinition::new(name, "k8s", "echo", SafetyLevel::ReadOnly),
                    EchoHandler,
                ))
                .unwrap();
        }
        registry
    }

    fn flow_call(scenario: &str) -> ToolCall {
        ToolCall::new(FLOW_TOOL)
            .with_arg("namespace", "shop")
            .with_arg("kind", "Pod")
            .with_arg("name", "api-1")
            .with_arg("scenario", scenario)
    }

    #[tokio::test]
    async fn test_flow_tool_through_invoker() {
        let invoker = Invoker::new(registry());
        let result = invoker
            .call(
                flow_call("pending"),
                Arc::new(Identity::namespaced(["shop"])),
                CancellationToken::new(),
            )
            .await
            .unwrap();

        let payload = result.payload;
        assert_eq!(payload["scenario"], json!("pending"));
        assert_eq!(payload["entry"]["nodeId"], json!("Pod/shop/api-1"));
        let tools: Vec<_> = payload["steps"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["tool"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            tools,
            vec!["scheduling.diagnose_pending", "k8s.describe", "storage.diagnose_pod"]
        );
        assert_eq!(result.metadata.namespaces, vec!["shop"]);
        assert_eq!(result.metadata.resources, vec!["Pod/shop/api-1"]);
    }

    #[tokio::test]
    async fn test_missing_tools_are_step_errors() {
        let invoker = Invoker::new(registry());
        let result = invoker
            .call(flow_call("crashloop"), Arc::new(Identity::cluster()), CancellationToken::new())
            .await
            .unwrap();

        let steps = result.payload["steps"].as_array().unwrap().clone();
        assert_eq!(steps[0]["error"]["code"], json!("NOT_FOUND"));
        assert_eq!(steps[1]["tool"], json!("k8s.describe"));
        assert!(steps[1].get("error").is_none());
    }

    #[tokio::test]
    async fn test_flow_tool_rejects_unknown_scenario() {
        let invoker = Invoker::new(registry());
        let err = invoker
            .call(flow_call("latency"), Arc::new(Identity::cluster()), CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENT");
    }

    #[test]
    fn test_definition_lists_scenarios() {
        let definition = diagnose_definition();
        assert_eq!(definition.safety, SafetyLevel::ReadOnly);
        let scenario = definition
            .parameters
            .iter()
            .find(|p| p.name == "scenario")
            .unwrap();
        assert!(scenario.description.contains("networkpolicy"));
    }
}
