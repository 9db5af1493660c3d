//! Configuration file loading for kube-flow
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `KUBE_FLOW_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./kube-flow.toml` or `./.kube-flow.toml`
//! 4. Global config: `$XDG_CONFIG_HOME/kube-flow/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileFlowConfig, FileOutputConfig, FileOutputFormat,
    FilePolicyConfig,
};
pub use loader::ConfigLoader;
