//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use kube_flow_domain::Identity;
use std::path::PathBuf;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, colored output
    Text,
    /// JSON output
    Json,
}

/// CLI arguments for kube-flow
#[derive(Parser, Debug)]
#[command(name = "kube-flow")]
#[command(author, version, about = "Guided diagnostic flows over a cluster resource graph")]
#[command(long_about = r#"
kube-flow runs tools against a cluster and chains them into diagnostic flows.

A flow starts at one resource, fetches the resource graph around it and walks
that graph for a scenario (traffic, pending, crashloop, autoscaling,
networkpolicy, mesh), calling one diagnostic tool per step.

Configuration files are loaded from (in priority order):
1. KUBE_FLOW_* environment variables
2. --config <path>        Explicit config file
3. ./kube-flow.toml       Project-level config
4. ~/.config/kube-flow/config.toml   Global config

Example:
  kube-flow --snapshot shop.json tools
  kube-flow --snapshot shop.json flow -n shop -k Service --name checkout -s traffic
  kube-flow --snapshot shop.json --allow-namespace shop call k8s.describe \
      --args '{"namespace": "shop", "kind": "Pod", "name": "checkout-7d"}'
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output format (overrides `[output] format`)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Serve tools from a recorded cluster snapshot (JSON)
    #[arg(long, value_name = "FILE", global = true)]
    pub snapshot: Option<PathBuf>,

    /// Act as a namespace-restricted caller allowed into NS (repeatable);
    /// without it the caller has cluster access
    #[arg(long = "allow-namespace", value_name = "NS", global = true)]
    pub allow_namespaces: Vec<String>,

    /// Only allow read-only tools, whatever the config says
    #[arg(long, global = true)]
    pub read_only: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List registered tools
    Tools,

    /// Invoke one tool
    Call {
        /// Tool name, e.g. k8s.describe
        name: String,

        /// Tool arguments as a JSON object
        #[arg(long, value_name = "JSON", default_value = "{}")]
        args: String,

        /// Add `confirm: true` to the arguments
        #[arg(long)]
        confirm: bool,
    },

    /// Run a diagnostic flow
    Flow {
        /// Namespace of the entry resource
        #[arg(short, long)]
        namespace: String,

        /// Kind of the entry resource, e.g. Service
        #[arg(short, long)]
        kind: String,

        /// Name of the entry resource
        #[arg(long)]
        name: String,

        /// Scenario to follow
        #[arg(short, long)]
        scenario: String,

        /// Step cap (default from config, 20)
        #[arg(long, value_name = "N")]
        max_steps: Option<i64>,
    },
}

impl Cli {
    /// Caller identity built from `--allow-namespace`
    pub fn identity(&self) -> Identity {
        if self.allow_namespaces.is_empty() {
            Identity::cluster()
        } else {
            Identity::namespaced(self.allow_namespaces.iter().cloned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube_flow_domain::Role;

    #[test]
    fn test_parse_flow() {
        let cli = Cli::try_parse_from([
            "kube-flow",
            "--snapshot",
            "shop.json",
            "flow",
            "-n",
            "shop",
            "-k",
            "Service",
            "--name",
            "checkout",
            "-s",
            "traffic",
            "--max-steps",
            "3",
            "-o",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.snapshot, Some(PathBuf::from("shop.json")));
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert_eq!(
            cli.command,
            Some(Command::Flow {
                namespace: "shop".to_string(),
                kind: "Service".to_string(),
                name: "checkout".to_string(),
                scenario: "traffic".to_string(),
                max_steps: Some(3),
            })
        );
        assert_eq!(cli.identity().role(), Role::Cluster);
    }

    #[test]
    fn test_parse_call_with_namespace_identity() {
        let cli = Cli::try_parse_from([
            "kube-flow",
            "call",
            "k8s.delete",
            "--args",
            r#"{"namespace": "shop"}"#,
            "--confirm",
            "--allow-namespace",
            "shop",
            "--allow-namespace",
            "billing",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Some(Command::Call { confirm: true, .. })));
        let identity = cli.identity();
        assert_eq!(identity.role(), Role::Namespace);
        assert!(identity.allows("billing"));
        assert!(!identity.allows("kube-system"));
    }

    #[test]
    fn test_flow_requires_entry() {
        assert!(Cli::try_parse_from(["kube-flow", "flow", "-n", "shop"]).is_err());
    }
}
