//! Tool domain module
//!
//! Defines what a tool *is* independently of how it runs: its
//! [`ToolDefinition`] (name, toolset, safety level, advisory input shape),
//! the [`ToolCall`] that invokes it, and the [`ToolResult`] / [`ToolError`]
//! it produces.
//!
//! ```text
//! ┌────────────────┐    ┌──────────────┐    ┌──────────────────────┐
//! │ ToolDefinition │───▶│ ToolCall     │───▶│ ToolResult/ToolError │
//! │ (catalogue)    │    │ (invocation) │    │ (output)             │
//! └────────────────┘    └──────────────┘    └──────────────────────┘
//! ```
//!
//! # Safety gating
//!
//! | Safety | Needs `confirm: true` | Runs when `read_only` | Runs when `disable_destructive` |
//! |--------|:---:|:---:|:---:|
//! | `ReadOnly` | no | yes | yes |
//! | `Write` | no | no | yes |
//! | `RiskyWrite` | yes | no | yes |
//! | `Destructive` | yes | no | no |
//!
//! Confirmation is checked by the invoker before [`ToolPolicy`] is consulted.

pub mod entities;
pub mod policy;
pub mod value_objects;

pub use entities::{
    CONFIRM_ARG, SafetyLevel, ToolArguments, ToolCall, ToolDefinition, ToolParameter, is_confirmed,
};
pub use policy::ToolPolicy;
pub use value_objects::{ToolError, ToolResult, ToolResultMetadata};
