//! Infrastructure layer for kube-flow
//!
//! This crate contains the tool registry and invoker, the built-in toolsets,
//! and configuration file loading.

pub mod config;
pub mod tools;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileFlowConfig, FileOutputConfig,
    FileOutputFormat, FilePolicyConfig,
};
pub use tools::{
    FlowToolset, Invoker, RegistryStats, Snapshot, SnapshotError, SnapshotToolset, ToolRegistry,
};
