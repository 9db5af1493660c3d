//! Tool registry, invoker and the built-in toolsets
//!
//! ## Toolsets
//!
//! - `flow`: the diagnostic planner (`flow.diagnose`)
//! - `snapshot`: graph, describe and diagnostic tools served from a recorded
//!   snapshot

pub mod flow;
pub mod snapshot;

mod invoker;
mod registry;

pub use flow::FlowToolset;
pub use invoker::Invoker;
pub use registry::{RegistryStats, ToolRegistry};
pub use snapshot::{DELETE_TOOL, Snapshot, SnapshotError, SnapshotToolset};
