//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into domain and application
//! types where they are used.

mod flow;
mod output;
mod policy;

pub use flow::FileFlowConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use policy::FilePolicyConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("flow.tools.{key} cannot be empty")]
    EmptyToolName { key: String },

    #[error("flow.tools.{key} = '{value}' is not a 'toolset.operation' name")]
    MalformedToolName { key: String, value: String },
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Global tool policy
    pub policy: FilePolicyConfig,
    /// Flow planner settings
    pub flow: FileFlowConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the configuration, returning every problem found.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();
        for (key, value) in self.flow.tool_entries() {
            if value.trim().is_empty() {
                issues.push(ConfigValidationError::EmptyToolName {
                    key: key.to_string(),
                });
            } else if !value.contains('.') {
                issues.push(ConfigValidationError::MalformedToolName {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
        }
        issues
    }
}
