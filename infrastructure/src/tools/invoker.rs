//! Tool Invoker
//!
//! [`Invoker`] is the only way a tool runs. External callers and handlers
//! making nested calls go through the same [`ToolInvoker::call`], so the
//! safety gate below applies to every invocation:
//!
//! 1. Look the tool up (`NotFound`)
//! 2. `RiskyWrite`/`Destructive` need `confirm: true` (`ConfirmationRequired`)
//! 3. The [`ToolPolicy`] may forbid the tool (`Forbidden`)
//! 4. Run the handler, racing it against the cancellation token
//!
//! Handler results and errors are returned as they are. The elapsed time is
//! only logged.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use kube_flow_application::ports::tool_handler::ToolRequest;
use kube_flow_application::ports::tool_invoker::ToolInvoker;
use kube_flow_domain::{Identity, ToolCall, ToolError, ToolPolicy, ToolResult};
use tokio_util::sync::CancellationToken;

use super::registry::ToolRegistry;

/// Dispatches calls to registered tools under a fixed policy
#[derive(Clone)]
pub struct Invoker {
    registry: Arc<ToolRegistry>,
    policy: ToolPolicy,
}

impl Invoker {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            policy: ToolPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ToolPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn policy(&self) -> ToolPolicy {
        self.policy
    }
}

#[async_trait]
impl ToolInvoker for Invoker {
    async fn call(
        &self,
        call: ToolCall,
        identity: Arc<Identity>,
        cancellation: CancellationToken,
    ) -> Result<ToolResult, ToolError> {
        let spec = self
            .registry
            .get(&call.tool_name)
            .ok_or_else(|| ToolError::not_found(&call.tool_name))?;
        let definition = spec.definition();

        if definition.requires_confirmation() && !call.is_confirmed() {
            tracing::warn!(
                tool = %definition.name,
                safety = %definition.safety,
                "Call rejected: confirmation required"
            );
            return Err(ToolError::confirmation_required(&definition.name));
        }

        if let Err(e) = self.policy.check(&definition.name, definition.safety) {
            tracing::warn!(tool = %definition.name, error = %e, "Call rejected by policy");
            return Err(e);
        }

        if cancellation.is_cancelled() {
            return Err(ToolError::cancelled(&definition.name));
        }

        tracing::debug!(
            tool = %definition.name,
            role = %identity.role().as_str(),
            "Dispatching tool call"
        );

        let name = definition.name.clone();
        let handler = Arc::clone(spec.handler());
        let request = ToolRequest::new(call, identity, cancellation.clone(), Arc::new(self.clone()));
        let started = Instant::now();

        let outcome = tokio::select! {
            biased;
            _ = cancellation.cancelled() => Err(ToolError::cancelled(&name)),
            result = handler.execute(request) => result,
        };

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match outcome {
            Ok(result) => {
                tracing::debug!(tool = %name, duration_ms = elapsed_ms, "Tool call finished");
                Ok(result)
            }
            Err(e) => {
                tracing::debug!(tool = %name, error = %e, duration_ms = elapsed_ms, "Tool call failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube_flow_application::ports::tool_handler::{ToolHandler, ToolSpec};
    use kube_flow_domain::{SafetyLevel, ToolDefinition};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counts executions so tests can prove a handler never ran
    #[derive(Clone, Default)]
    struct CountingHandler {
        runs: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ToolHandler for CountingHandler {
        async fn execute(&self, request: ToolRequest) -> Result<ToolResult, ToolError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(ToolResult::new(json!({"tool": request.tool_name()})))
        }
    }

    /// Calls `inner.tool` as a nested call, optionally re-asserting confirmation
    struct ComposingHandler {
        confirm_nested: bool,
    }

    #[async_trait]
    impl ToolHandler for ComposingHandler {
        async fn execute(&self, request: ToolRequest) -> Result<ToolResult, ToolError> {
            let nested = ToolCall::new("inner.delete");
            if self.confirm_nested {
                request.call_nested_confirmed(nested).await
            } else {
                request.call_nested(nested).await
            }
        }
    }

    struct SlowHandler;

    #[async_trait]
    impl ToolHandler for SlowHandler {
        async fn execute(&self, _request: ToolRequest) -> Result<ToolResult, ToolError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(ToolResult::new(json!(null)))
        }
    }

    fn definition(name: &str, safety: SafetyLevel) -> ToolDefinition {
        ToolDefinition::new(name, "test", "test tool", safety)
    }

    fn setup() -> (Arc<ToolRegistry>, CountingHandler) {
        let registry = Arc::new(ToolRegistry::new());
        let handler = CountingHandler::default();
        for (name, safety) in [
            ("test.read", SafetyLevel::ReadOnly),
            ("test.write", SafetyLevel::Write),
            ("test.risky", SafetyLevel::RiskyWrite),
            ("test.delete", SafetyLevel::Destructive),
            ("inner.delete", SafetyLevel::Destructive),
        ] {
            registry
                .add(ToolSpec::new(definition(name, safety), handler.clone()))
                .unwrap();
        }
        (registry, handler)
    }

    async fn call(invoker: &Invoker, call: ToolCall) -> Result<ToolResult, ToolError> {
        invoker
            .call(call, Arc::new(Identity::cluster()), CancellationToken::new())
            .await
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let (registry, _) = setup();
        let err = call(&Invoker::new(registry), ToolCall::new("test.missing"))
            .await
            .unwrap_err();
        assert_eq!(err, ToolError::not_found("test.missing"));
    }

    #[tokio::test]
    async fn test_read_and_write_need_no_confirmation() {
        let (registry, handler) = setup();
        let invoker = Invoker::new(registry);

        let result = call(&invoker, ToolCall::new("test.read")).await.unwrap();
        assert_eq!(result.payload, json!({"tool": "test.read"}));
        assert_eq!(result, ToolResult::new(json!({"tool": "test.read"})));
        call(&invoker, ToolCall::new("test.write")).await.unwrap();
        assert_eq!(handler.runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_confirmation_required_before_handler_runs() {
        let (registry, handler) = setup();
        let invoker = Invoker::new(registry);

        for name in ["test.risky", "test.delete"] {
            let err = call(&invoker, ToolCall::new(name)).await.unwrap_err();
            assert_eq!(err, ToolError::confirmation_required(name));

            let err = call(&invoker, ToolCall::new(name).with_arg("confirm", false))
                .await
                .unwrap_err();
            assert_eq!(err.code(), "CONFIRMATION_REQUIRED");

            // only a JSON boolean counts
            let err = call(&invoker, ToolCall::new(name).with_arg("confirm", "true"))
                .await
                .unwrap_err();
            assert_eq!(err.code(), "CONFIRMATION_REQUIRED");
        }
        assert_eq!(handler.runs.load(Ordering::SeqCst), 0);

        call(&invoker, ToolCall::new("test.delete").confirmed()).await.unwrap();
        assert_eq!(handler.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_read_only_policy() {
        let (registry, handler) = setup();
        let invoker = Invoker::new(registry).with_policy(ToolPolicy::default().with_read_only(true));

        call(&invoker, ToolCall::new("test.read")).await.unwrap();
        let err = call(&invoker, ToolCall::new("test.write")).await.unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
        let err = call(&invoker, ToolCall::new("test.risky").confirmed()).await.unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
        assert_eq!(handler.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_confirmation_checked_before_policy() {
        let (registry, _) = setup();
        let invoker = Invoker::new(registry).with_policy(ToolPolicy::read_only());
        let err = call(&invoker, ToolCall::new("test.delete")).await.unwrap_err();
        assert_eq!(err.code(), "CONFIRMATION_REQUIRED");
    }

    #[tokio::test]
    async fn test_disable_destructive_even_when_confirmed() {
        let (registry, handler) = setup();
        let invoker =
            Invoker::new(registry).with_policy(ToolPolicy::default().with_disable_destructive(true));

        let err = call(&invoker, ToolCall::new("test.delete").confirmed()).await.unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
        call(&invoker, ToolCall::new("test.risky").confirmed()).await.unwrap();
        assert_eq!(handler.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_nested_call_is_gated_too() {
        let (registry, handler) = setup();
        registry
            .add(ToolSpec::new(
                definition("outer.compose", SafetyLevel::RiskyWrite),
                ComposingHandler { confirm_nested: false },
            ))
            .unwrap();
        registry
            .add(ToolSpec::new(
                definition("outer.compose_confirmed", SafetyLevel::RiskyWrite),
                ComposingHandler { confirm_nested: true },
            ))
            .unwrap();
        let invoker = Invoker::new(registry);

        // confirming the outer call does not confirm the nested one
        let err = call(&invoker, ToolCall::new("outer.compose").confirmed())
            .await
            .unwrap_err();
        assert_eq!(err, ToolError::confirmation_required("inner.delete"));
        assert_eq!(handler.runs.load(Ordering::SeqCst), 0);

        let result = call(&invoker, ToolCall::new("outer.compose_confirmed").confirmed())
            .await
            .unwrap();
        assert_eq!(result.payload, json!({"tool": "inner.delete"}));
        assert_eq!(handler.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancellation_aborts_running_handler() {
        let registry = Arc::new(ToolRegistry::new());
        registry
            .add(ToolSpec::new(definition("test.slow", SafetyLevel::ReadOnly), SlowHandler))
            .unwrap();
        let invoker = Invoker::new(registry);

        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let err = invoker
            .call(ToolCall::new("test.slow"), Arc::new(Identity::cluster()), token)
            .await
            .unwrap_err();
        assert_eq!(err, ToolError::cancelled("test.slow"));
    }

    #[tokio::test]
    async fn test_already_cancelled_call_does_not_run() {
        let (registry, handler) = setup();
        let token = CancellationToken::new();
        token.cancel();

        let err = Invoker::new(registry)
            .call(ToolCall::new("test.read"), Arc::new(Identity::cluster()), token)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(handler.runs.load(Ordering::SeqCst), 0);
    }
}
