//! Application layer for kube-flow
//!
//! This crate contains the tool ports, application configuration and the
//! diagnostic flow planner. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{FlowParams, FlowToolNames};
pub use ports::{
    tool_handler::{ToolHandler, ToolRequest, ToolSpec},
    tool_invoker::ToolInvoker,
    toolset::ToolsetProvider,
};
pub use use_cases::run_flow::{FLOW_TOOL, RunFlowInput, RunFlowUseCase};
