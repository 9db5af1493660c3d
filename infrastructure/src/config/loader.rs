//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Application directory under the user's config dir
const APP_DIR: &str = "kube-flow";
/// Project-level config file names, checked in order
const PROJECT_FILES: [&str; 2] = ["kube-flow.toml", ".kube-flow.toml"];
/// Prefix of environment overrides, e.g. `KUBE_FLOW_POLICY__READ_ONLY=true`
const ENV_PREFIX: &str = "KUBE_FLOW_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables prefixed `KUBE_FLOW_` (`__` separates keys)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./kube-flow.toml` or `./.kube-flow.toml`
    /// 4. Global config: `$XDG_CONFIG_HOME/kube-flow/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        let figment = Self::files(
            Self::global_config_path().as_deref(),
            Self::project_config_path().as_deref(),
            config_path.map(PathBuf::as_path),
        )
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment.extract().map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// File layers on top of the defaults, lowest priority first
    fn files(global: Option<&Path>, project: Option<&Path>, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(path) = global
            && path.exists()
        {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = project {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }
        figment
    }

    /// Get the global config file path
    ///
    /// Returns `$XDG_CONFIG_HOME/kube-flow/config.toml` if set, otherwise the
    /// platform config dir (e.g. `~/.config/kube-flow/config.toml`).
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .into_iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(config_path: Option<&PathBuf>) {
        println!("Configuration sources (in priority order):");
        println!("  [ENV  ] Environment: {}*", ENV_PREFIX);

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{:<5}] Explicit: {}", mark, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./kube-flow.toml or ./.kube-flow.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn toml_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert!(!config.policy.read_only);
        assert_eq!(config.flow.default_max_steps, 20);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("kube-flow"));
    }

    #[test]
    fn test_layers_merge_by_priority() {
        let global = toml_file(
            r#"
[policy]
read_only = true

[flow]
default_max_steps = 5
"#,
        );
        let project = toml_file(
            r#"
[flow]
default_max_steps = 10

[flow.tools]
describe = "inventory.describe"
"#,
        );
        let explicit = toml_file(
            r#"
[flow.tools]
graph = "inventory.graph"
"#,
        );

        let config: FileConfig = ConfigLoader::files(
            Some(global.path()),
            Some(project.path()),
            Some(explicit.path()),
        )
        .extract()
        .unwrap();

        assert!(config.policy.read_only);
        assert_eq!(config.flow.default_max_steps, 10);
        assert_eq!(config.flow.tools.describe, "inventory.describe");
        assert_eq!(config.flow.tools.graph, "inventory.graph");
        assert_eq!(config.flow.tools.network, "network.diagnose_service");
    }

    #[test]
    fn test_missing_global_file_is_skipped() {
        let config: FileConfig =
            ConfigLoader::files(Some(Path::new("/nonexistent/kube-flow/config.toml")), None, None)
                .extract()
                .unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        let explicit = toml_file("[policy]\nread_only = \"sometimes\"\n");
        let result: Result<FileConfig, _> =
            ConfigLoader::files(None, None, Some(explicit.path())).extract();
        assert!(result.is_err());
    }
}
