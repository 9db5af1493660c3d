//! Tool invoker port
//!
//! The single entry point for running a registered tool, used both by
//! external callers and by tools that call other tools.

use async_trait::async_trait;
use kube_flow_domain::{Identity, ToolCall, ToolError, ToolResult};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Port for dispatching tool calls.
///
/// Implementations resolve the tool, enforce confirmation and policy, run
/// the handler, and return its result or error unchanged.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    async fn call(
        &self,
        call: ToolCall,
        identity: Arc<Identity>,
        cancellation: CancellationToken,
    ) -> Result<ToolResult, ToolError>;
}
