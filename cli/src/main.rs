//! CLI entrypoint for kube-flow
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use kube_flow_application::{FLOW_TOOL, ToolInvoker};
use kube_flow_domain::{FlowResult, Identity, ToolArguments, ToolCall, ToolError, ToolResult};
use kube_flow_infrastructure::{
    ConfigLoader, FileConfig, FileOutputFormat, FlowToolset, Invoker, Snapshot, SnapshotToolset,
    ToolRegistry,
};
use kube_flow_presentation::{Cli, Command, ConsoleFormatter, OutputFormat};
use serde_json::Value;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(&cli)?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(ExitCode::SUCCESS);
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("failed to load configuration")?
    };
    for issue in config.validate() {
        warn!("Config: {}", issue);
    }

    if !config.output.color {
        colored::control::set_override(false);
    }
    let format = output_format(&cli, &config);

    let Some(command) = cli.command.clone() else {
        bail!("No command given. Run `kube-flow --help` for usage.");
    };

    // === Dependency Injection ===
    let registry = Arc::new(ToolRegistry::new());
    let params = config.flow.to_params();
    registry.register_toolset(&FlowToolset::new(params.clone()))?;

    if let Some(path) = &cli.snapshot {
        let snapshot = Snapshot::from_file(path)?;
        let added = registry.register_toolset(&SnapshotToolset::new(snapshot, params.tools.clone()))?;
        info!("Loaded {} snapshot tools from {}", added, path.display());
    }

    let mut policy = config.policy.to_policy();
    if cli.read_only {
        policy = policy.with_read_only(true);
    }
    let invoker = Invoker::new(Arc::clone(&registry)).with_policy(policy);

    let cancellation = CancellationToken::new();
    let on_interrupt = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    let identity = Arc::new(cli.identity());
    info!(role = %identity.role(), "Starting kube-flow");

    match command {
        Command::Tools => {
            let tools = registry.list();
            let output = match format {
                OutputFormat::Text => ConsoleFormatter::format_tools(&tools),
                OutputFormat::Json => ConsoleFormatter::format_json(&tools),
            };
            println!("{}", output);
            Ok(ExitCode::SUCCESS)
        }

        Command::Call {
            name,
            args,
            confirm,
        } => {
            let arguments = parse_arguments(&args)?;
            let mut call = ToolCall::new(name).with_arguments(arguments);
            if confirm {
                call = call.confirmed();
            }
            let outcome = invoker.call(call, identity, cancellation).await;
            Ok(report(outcome, format, |result| {
                ConsoleFormatter::format_result(&result)
            }))
        }

        Command::Flow {
            namespace,
            kind,
            name,
            scenario,
            max_steps,
        } => {
            let mut call = ToolCall::new(FLOW_TOOL)
                .with_arg("namespace", namespace)
                .with_arg("kind", kind)
                .with_arg("name", name)
                .with_arg("scenario", scenario);
            if let Some(max_steps) = max_steps {
                call = call.with_arg("maxSteps", max_steps);
            }
            let outcome = run_flow(&invoker, call, identity, cancellation).await;
            Ok(report(outcome, format, |flow| ConsoleFormatter::format_flow(&flow)))
        }
    }
}

fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    // Initialize logging based on verbosity level
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let (file_layer, guard) = match &cli.log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

fn output_format(cli: &Cli, config: &FileConfig) -> OutputFormat {
    cli.output.unwrap_or(match config.output.format {
        Some(FileOutputFormat::Json) => OutputFormat::Json,
        Some(FileOutputFormat::Text) | None => OutputFormat::Text,
    })
}

fn parse_arguments(raw: &str) -> Result<ToolArguments> {
    let value: Value = serde_json::from_str(raw).context("--args is not valid JSON")?;
    match value {
        Value::Object(arguments) => Ok(arguments),
        other => bail!("--args must be a JSON object, got {}", other),
    }
}

async fn run_flow(
    invoker: &Invoker,
    call: ToolCall,
    identity: Arc<Identity>,
    cancellation: CancellationToken,
) -> Result<FlowResult, ToolError> {
    let result: ToolResult = invoker.call(call, identity, cancellation).await?;
    serde_json::from_value(result.payload)
        .map_err(|e| ToolError::invalid_payload(FLOW_TOOL, e.to_string()))
}

/// Print a command outcome and pick the exit code
fn report<T: serde::Serialize>(
    outcome: Result<T, ToolError>,
    format: OutputFormat,
    text: impl FnOnce(T) -> String,
) -> ExitCode {
    match outcome {
        Ok(value) => {
            let output = match format {
                OutputFormat::Text => text(value),
                OutputFormat::Json => ConsoleFormatter::format_json(&value),
            };
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(error) => {
            match format {
                OutputFormat::Text => eprintln!("{}", ConsoleFormatter::format_error(&error)),
                OutputFormat::Json => eprintln!(
                    "{}",
                    ConsoleFormatter::format_json(&serde_json::json!({
                        "code": error.code(),
                        "message": error.to_string(),
                    }))
                ),
            }
            ExitCode::FAILURE
        }
    }
}
