//! Tool Registry
//!
//! The [`ToolRegistry`] holds every registered [`ToolSpec`] by name. Toolset
//! providers hand their tools over once at startup; afterwards the registry
//! is read by every call.
//!
//! # Usage
//!
//! ```ignore
//! use kube_flow_infrastructure::tools::{SnapshotToolset, ToolRegistry};
//!
//! let registry = ToolRegistry::new();
//! registry.register_toolset(&SnapshotToolset::new(snapshot, names))?;
//!
//! assert!(registry.has_tool("k8s.describe"));
//! let spec = registry.get("k8s.describe").unwrap();
//! ```
//!
//! # Reloads
//!
//! The tool set lives behind an `Arc` that is swapped as a whole.
//! [`ToolRegistry::replace_all`] builds the new set off to the side and only
//! swaps it in once every spec has been accepted, so readers see either the
//! old set or the new one, never a mix. A reader holding a snapshot from
//! [`ToolRegistry::snapshot`] keeps it unchanged across reloads.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use kube_flow_application::ports::tool_handler::ToolSpec;
use kube_flow_application::ports::toolset::ToolsetProvider;
use kube_flow_domain::{ToolDefinition, ToolError};

type ToolMap = BTreeMap<String, ToolSpec>;

/// Name-indexed set of registered tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<Arc<ToolMap>>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one tool.
    ///
    /// Fails with `DuplicateName` if the name is taken; the existing
    /// registration is left untouched.
    pub fn add(&self, spec: ToolSpec) -> Result<(), ToolError> {
        validate_name(spec.name())?;

        let mut guard = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        if guard.contains_key(spec.name()) {
            tracing::warn!(tool = spec.name(), "Rejected duplicate tool registration");
            return Err(ToolError::duplicate_name(spec.name()));
        }

        tracing::debug!(
            tool = spec.name(),
            toolset = %spec.definition().toolset,
            safety = %spec.definition().safety,
            "Registered tool"
        );
        Arc::make_mut(&mut guard).insert(spec.name().to_string(), spec);
        Ok(())
    }

    /// Register every tool of a toolset, stopping at the first failure.
    ///
    /// Returns the number of tools registered.
    pub fn register_toolset(&self, toolset: &dyn ToolsetProvider) -> Result<usize, ToolError> {
        let specs = toolset.tools();
        let count = specs.len();
        for spec in specs {
            self.add(spec)?;
        }
        tracing::debug!(toolset = toolset.id(), tools = count, "Registered toolset");
        Ok(count)
    }

    /// Replace the whole tool set atomically.
    ///
    /// If any spec is invalid or two specs share a name, nothing changes.
    pub fn replace_all(&self, specs: Vec<ToolSpec>) -> Result<(), ToolError> {
        let mut next = ToolMap::new();
        for spec in specs {
            validate_name(spec.name())?;
            if next.contains_key(spec.name()) {
                return Err(ToolError::duplicate_name(spec.name()));
            }
            next.insert(spec.name().to_string(), spec);
        }

        let count = next.len();
        *self.tools.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(next);
        tracing::info!(tools = count, "Reloaded tool registry");
        Ok(())
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<ToolSpec> {
        self.snapshot().get(name).cloned()
    }

    /// Check if a tool is registered
    pub fn has_tool(&self, name: &str) -> bool {
        self.snapshot().contains_key(name)
    }

    /// Definitions of every registered tool, sorted by name
    pub fn list(&self) -> Vec<ToolDefinition> {
        self.snapshot()
            .values()
            .map(|spec| spec.definition().clone())
            .collect()
    }

    /// The current tool set; unaffected by later registrations or reloads
    pub fn snapshot(&self) -> Arc<ToolMap> {
        Arc::clone(&self.tools.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Get statistics about registered tools
    pub fn stats(&self) -> RegistryStats {
        let tools = self.snapshot();
        let mut tools_per_toolset = HashMap::new();
        for spec in tools.values() {
            *tools_per_toolset
                .entry(spec.definition().toolset.clone())
                .or_insert(0) += 1;
        }

        RegistryStats {
            total_toolsets: tools_per_toolset.len(),
            total_tools: tools.len(),
            tools_per_toolset,
        }
    }
}

/// Statistics about the registry
#[derive(Debug, Clone)]
pub struct RegistryStats {
    pub total_toolsets: usize,
    pub total_tools: usize,
    pub tools_per_toolset: HashMap<String, usize>,
}

/// Names are `toolset.operation`: at least one dot and no empty segment.
fn validate_name(name: &str) -> Result<(), ToolError> {
    let well_formed = name.contains('.') && name.split('.').all(|segment| !segment.is_empty());
    if well_formed {
        Ok(())
    } else {
        Err(ToolError::invalid_argument(
            name,
            "tool names must look like 'toolset.operation'",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use kube_flow_application::ports::tool_handler::{ToolHandler, ToolRequest};
    use kube_flow_domain::{SafetyLevel, ToolResult};
    use serde_json::json;

    struct StaticHandler(&'static str);

    #[async_trait]
    impl ToolHandler for StaticHandler {
        async fn execute(&self, _request: ToolRequest) -> Result<ToolResult, ToolError> {
            Ok(ToolResult::new(json!(self.0)))
        }
    }

    fn spec(name: &str, description: &'static str) -> ToolSpec {
        let toolset = name.split('.').next().unwrap_or_default();
        ToolSpec::new(
            ToolDefinition::new(name, toolset, description, SafetyLevel::ReadOnly),
            StaticHandler(description),
        )
    }

    struct TwoTools;

    impl ToolsetProvider for TwoTools {
        fn id(&self) -> &str {
            "net"
        }

        fn tools(&self) -> Vec<ToolSpec> {
            vec![spec("net.ping", "ping"), spec("net.trace", "trace")]
        }
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let registry = ToolRegistry::new();
        registry.add(spec("k8s.describe", "first")).unwrap();

        let err = registry.add(spec("k8s.describe", "second")).unwrap_err();
        assert_eq!(err, ToolError::duplicate_name("k8s.describe"));

        let kept = registry.get("k8s.describe").unwrap();
        assert_eq!(kept.definition().description, "first");
        assert_eq!(registry.list().len(), 1);
    }

    #[test]
    fn test_rejects_names_without_toolset() {
        let registry = ToolRegistry::new();
        for name in ["describe", ".describe", "k8s.", ""] {
            let err = registry.add(spec(name, "bad")).unwrap_err();
            assert_eq!(err.code(), "INVALID_ARGUMENT", "{name}");
        }
        assert!(registry.list().is_empty());
    }

    #[test]
    fn test_list_is_sorted() {
        let registry = ToolRegistry::new();
        registry.add(spec("k8s.graph", "graph")).unwrap();
        registry.add(spec("flow.diagnose", "flow")).unwrap();
        registry.add(spec("k8s.describe", "describe")).unwrap();

        let names: Vec<_> = registry.list().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["flow.diagnose", "k8s.describe", "k8s.graph"]);
    }

    #[test]
    fn test_register_toolset_and_stats() {
        let registry = ToolRegistry::new();
        assert_eq!(registry.register_toolset(&TwoTools).unwrap(), 2);
        registry.add(spec("k8s.graph", "graph")).unwrap();

        let stats = registry.stats();
        assert_eq!(stats.total_tools, 3);
        assert_eq!(stats.total_toolsets, 2);
        assert_eq!(stats.tools_per_toolset["net"], 2);

        let err = registry.register_toolset(&TwoTools).unwrap_err();
        assert_eq!(err.code(), "DUPLICATE_NAME");
    }

    #[test]
    fn test_replace_all_is_all_or_nothing() {
        let registry = ToolRegistry::new();
        registry.add(spec("k8s.graph", "old")).unwrap();
        let before = registry.snapshot();

        let err = registry
            .replace_all(vec![spec("net.ping", "a"), spec("net.ping", "b")])
            .unwrap_err();
        assert_eq!(err.code(), "DUPLICATE_NAME");
        assert!(registry.has_tool("k8s.graph"));
        assert!(!registry.has_tool("net.ping"));

        registry
            .replace_all(vec![spec("net.ping", "a"), spec("net.trace", "b")])
            .unwrap();
        assert!(!registry.has_tool("k8s.graph"));
        assert_eq!(registry.list().len(), 2);

        // earlier readers keep the set they saw
        assert!(before.contains_key("k8s.graph"));
        assert_eq!(before.len(), 1);
    }
}
