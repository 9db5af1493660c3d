//! Per-invocation flow state and the shared step primitive.

use super::types::FLOW_TOOL;
use crate::config::FlowToolNames;
use crate::ports::tool_invoker::ToolInvoker;
use kube_flow_domain::{FlowStep, GraphNode, Identity, StepError, ToolArguments, ToolCall, ToolError};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// State of one flow run. Created per invocation and dropped with the
/// response.
pub(super) struct FlowRun {
    invoker: Arc<dyn ToolInvoker>,
    identity: Arc<Identity>,
    cancellation: CancellationToken,
    pub(super) tools: FlowToolNames,
    /// Namespace of the entry; namespace-scoped diagnostics run here
    pub(super) namespace: String,
    max_steps: usize,
    steps: Vec<FlowStep>,
    warnings: Vec<String>,
}

impl FlowRun {
    pub(super) fn new(
        invoker: Arc<dyn ToolInvoker>,
        identity: Arc<Identity>,
        cancellation: CancellationToken,
        tools: FlowToolNames,
        namespace: impl Into<String>,
        max_steps: usize,
    ) -> Self {
        Self {
            invoker,
            identity,
            cancellation,
            tools,
            namespace: namespace.into(),
            max_steps,
            steps: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(super) fn is_full(&self) -> bool {
        self.steps.len() >= self.max_steps
    }

    pub(super) fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Append one step.
    ///
    /// A cancelled flow fails even past the cap. Once the cap is reached
    /// this returns `Ok(())` without recording anything. A failing tool
    /// call is recorded on the step and is not an error of the flow; only
    /// cancellation stops the flow.
    pub(super) async fn add_step(
        &mut self,
        subject: &GraphNode,
        tool: Option<String>,
        arguments: ToolArguments,
        notes: impl Into<String>,
    ) -> Result<(), ToolError> {
        if self.cancellation.is_cancelled() {
            return Err(ToolError::cancelled(FLOW_TOOL));
        }
        if self.is_full() {
            return Ok(());
        }

        let ordinal = self.steps.len() + 1;
        let notes = notes.into();
        let (result, error) = match &tool {
            Some(name) => {
                debug!(ordinal, tool = %name, subject = %subject.id, "running flow step");
                let call = ToolCall::new(name).with_arguments(arguments.clone());
                match self
                    .invoker
                    .call(call, Arc::clone(&self.identity), self.cancellation.child_token())
                    .await
                {
                    Ok(result) => (Some(result.payload), None),
                    Err(error) if error.is_cancelled() && self.cancellation.is_cancelled() => {
                        return Err(ToolError::cancelled(FLOW_TOOL));
                    }
                    Err(error) => {
                        info!(ordinal, tool = %name, error = %error, "flow step failed, continuing");
                        (None, Some(StepError::from(&error)))
                    }
                }
            }
            None => (None, None),
        };

        self.steps.push(FlowStep {
            ordinal,
            subject: subject.clone(),
            tool,
            arguments,
            result,
            error,
            notes,
        });
        Ok(())
    }

    pub(super) fn finish(self) -> (Vec<FlowStep>, Vec<String>) {
        (self.steps, self.warnings)
    }
}

/// `{namespace, kind, name}` for describing a node
pub(super) fn describe_args(node: &GraphNode) -> ToolArguments {
    let mut args = ToolArguments::new();
    args.insert("namespace".into(), node.namespace.clone().into());
    args.insert("kind".into(), node.kind.clone().into());
    args.insert("name".into(), node.name.clone().into());
    args
}

/// `{namespace}` for namespace-scoped diagnostics
pub(super) fn namespace_args(namespace: &str) -> ToolArguments {
    let mut args = ToolArguments::new();
    args.insert("namespace".into(), namespace.into());
    args
}

/// `{namespace, <key>: name}` for per-resource diagnostics
pub(super) fn named_args(node: &GraphNode, key: &str) -> ToolArguments {
    let mut args = namespace_args(&node.namespace);
    args.insert(key.into(), node.name.clone().into());
    args
}
