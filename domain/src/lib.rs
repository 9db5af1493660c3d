//! Domain layer for kube-flow
//!
//! This crate contains the core entities and pure logic of the diagnostic
//! orchestration core. It has no dependencies on async runtimes, I/O or
//! presentation concerns.
//!
//! # Core Concepts
//!
//! - **Tool**: a named operation with a [`SafetyLevel`]; see [`tool`]
//! - **Identity**: who is calling, and which namespaces they may touch; see [`auth`]
//! - **Resource graph**: typed nodes and edges parsed from a collaborator's
//!   payload; see [`graph`]
//! - **Flow**: the step-by-step record of a diagnostic scenario; see [`flow`]

pub mod auth;
pub mod flow;
pub mod graph;
pub mod tool;

// Re-export commonly used types
pub use auth::{Identity, Role, check_namespace};
pub use flow::{
    DEFAULT_MAX_STEPS, FlowEntry, FlowResult, FlowStep, MeshKind, Scenario, StepError,
    UnknownScenario,
};
pub use graph::{GraphEdge, GraphNode, ResourceGraph, parse_graph};
pub use tool::{
    CONFIRM_ARG, SafetyLevel, ToolArguments, ToolCall, ToolDefinition, ToolError, ToolParameter,
    ToolPolicy, ToolResult, ToolResultMetadata,
};
