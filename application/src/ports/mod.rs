//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod tool_handler;
pub mod tool_invoker;
pub mod toolset;
