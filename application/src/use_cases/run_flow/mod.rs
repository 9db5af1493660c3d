//! Run Flow use case.
//!
//! Turns a diagnostic intent into an ordered chain of tool calls anchored at
//! one resource:
//!
//! 1. Validate the input and check namespace access
//! 2. Fetch the resource graph through the invoker and parse it
//! 3. Resolve the entry node (an unresolved entry is only a warning)
//! 4. Walk the graph with the scenario's traversal, one step per call
//!
//! Setup failures abort the flow. A failing step call is recorded on the step
//! and the traversal goes on.

mod run;
mod scenarios;
pub mod types;

pub use types::{FLOW_TOOL, RunFlowInput};

use crate::config::FlowParams;
use crate::ports::tool_invoker::ToolInvoker;
use kube_flow_domain::{
    FlowEntry, FlowResult, GraphNode, Identity, Scenario, ToolCall, ToolError, check_namespace,
    parse_graph,
};
use run::FlowRun;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Use case for running a diagnostic flow.
#[derive(Clone)]
pub struct RunFlowUseCase {
    invoker: Arc<dyn ToolInvoker>,
    params: FlowParams,
    cancellation: CancellationToken,
}

impl RunFlowUseCase {
    pub fn new(invoker: Arc<dyn ToolInvoker>, params: FlowParams) -> Self {
        Self {
            invoker,
            params,
            cancellation: CancellationToken::new(),
        }
    }

    /// Tie the flow to an outer request; cancelling it stops the flow.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub async fn execute(
        &self,
        input: RunFlowInput,
        identity: Arc<Identity>,
    ) -> Result<FlowResult, ToolError> {
        let missing = input.missing_fields();
        if !missing.is_empty() {
            return Err(ToolError::invalid_argument(
                FLOW_TOOL,
                format!("missing required fields: {}", missing.join(", ")),
            ));
        }
        let scenario = input
            .scenario
            .parse::<Scenario>()
            .map_err(|e| ToolError::invalid_argument(FLOW_TOOL, e.to_string()))?;
        check_namespace(&identity, &input.namespace, true)?;

        info!(
            scenario = %scenario.as_str(),
            namespace = %input.namespace,
            kind = %input.kind,
            name = %input.name,
            "Starting flow"
        );

        let tools = &self.params.tools;
        let graph_call = ToolCall::new(&tools.graph)
            .with_arg("namespace", input.namespace.as_str())
            .with_arg("kind", input.kind.as_str())
            .with_arg("name", input.name.as_str());
        let graph_result = self
            .invoker
            .call(graph_call, Arc::clone(&identity), self.cancellation.child_token())
            .await?;
        let graph = parse_graph(&graph_result.payload)?;
        debug!(
            nodes = graph.nodes().len(),
            edges = graph.edges().len(),
            "Parsed resource graph"
        );

        let resolved = graph
            .resolve_entry(&input.kind, &input.namespace, &input.name)
            .cloned();
        let node_id = resolved.as_ref().map(|node| node.id.clone());

        let max_steps = self.params.effective_max_steps(input.max_steps);
        let mut run = FlowRun::new(
            Arc::clone(&self.invoker),
            identity,
            self.cancellation.clone(),
            tools.clone(),
            input.namespace.as_str(),
            max_steps,
        );

        let entry = match resolved {
            Some(node) => node,
            None => {
                warn!(kind = %input.kind, name = %input.name, "Entry not found in graph");
                run.warn(format!(
                    "entry {}/{}/{} not found in graph",
                    input.kind, input.namespace, input.name
                ));
                GraphNode::new(&input.kind, &input.namespace, &input.name)
            }
        };

        run.run_scenario(scenario, &graph, &entry).await?;
        if run.is_full() {
            debug!(max_steps, "Flow reached its step cap");
        }
        let (steps, run_warnings) = run.finish();

        let mut warnings: Vec<String> = graph.warnings().to_vec();
        warnings.extend(run_warnings);

        let failed = steps.iter().filter(|s| s.failed()).count();
        info!(
            scenario = %scenario.as_str(),
            steps = steps.len(),
            failed,
            "Flow finished"
        );

        Ok(FlowResult {
            entry: FlowEntry {
                namespace: input.namespace,
                kind: input.kind,
                name: input.name,
                node_id,
            },
            scenario,
            graph: graph_result.payload,
            steps,
            warnings,
        })
    }
}
