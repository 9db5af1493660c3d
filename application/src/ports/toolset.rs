//! Toolset provider port
//!
//! Toolsets are groups of related tools that share setup (a client, a data
//! source, configuration). Each provider hands its tools to the registry as
//! [`ToolSpec`]s; the registry does not know what a toolset does.

use super::tool_handler::ToolSpec;

pub trait ToolsetProvider: Send + Sync {
    /// Toolset identifier, reported in the definitions of its tools
    ///
    /// Examples: "flow", "snapshot"
    fn id(&self) -> &str;

    /// Tools provided by this toolset
    fn tools(&self) -> Vec<ToolSpec>;
}
