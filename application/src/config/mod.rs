//! Application-level configuration.
//!
//! - [`FlowParams`]: step cap and the tool names the flow planner calls

pub mod flow_params;

pub use flow_params::{FlowParams, FlowToolNames};
