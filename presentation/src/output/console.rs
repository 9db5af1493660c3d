//! Console output formatter for tool and flow results

use colored::{ColoredString, Colorize};
use kube_flow_domain::{FlowResult, FlowStep, SafetyLevel, ToolDefinition, ToolError, ToolResult};
use serde::Serialize;

/// Formats results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the registered tool catalogue
    pub fn format_tools(tools: &[ToolDefinition]) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("Registered Tools"));
        output.push('\n');

        if tools.is_empty() {
            output.push_str(&format!("\n{}\n", "No tools registered.".dimmed()));
            output.push_str(&Self::footer());
            return output;
        }

        let width = tools.iter().map(|t| t.name.len()).max().unwrap_or(0);
        for tool in tools {
            output.push_str(&format!(
                "\n{:<width$}  {:<12} {}\n",
                tool.name.bold(),
                Self::safety(tool.safety),
                format!("[{}]", tool.toolset).dimmed(),
                width = width,
            ));
            output.push_str(&format!("{}\n", Self::indent(&tool.description, "    ")));
        }

        output.push_str(&format!("\n{} {}\n", "Total:".cyan().bold(), tools.len()));
        output.push_str(&Self::footer());
        output
    }

    /// Format a flow result, step by step
    pub fn format_flow(result: &FlowResult) -> String {
        let mut output = String::new();
        output.push_str(&Self::header(&format!("Flow: {}", result.scenario.as_str())));
        output.push('\n');

        let entry = &result.entry;
        output.push_str(&format!(
            "{} {} {}/{}\n",
            "Entry:".cyan().bold(),
            entry.kind,
            entry.namespace,
            entry.name
        ));
        match &entry.node_id {
            Some(id) => output.push_str(&format!("{} {}\n", "Node:".cyan().bold(), id)),
            None => output.push_str(&format!(
                "{} {}\n",
                "Node:".cyan().bold(),
                "(not found in graph)".yellow()
            )),
        }

        output.push_str(&Self::section_header("Steps"));
        if result.steps.is_empty() {
            output.push_str(&format!("{}\n", "No steps.".dimmed()));
        }
        for step in &result.steps {
            output.push_str(&Self::format_step(step));
        }

        if !result.warnings.is_empty() {
            output.push_str(&format!("\n{}\n", "Warnings:".yellow().bold()));
            for warning in &result.warnings {
                output.push_str(&format!("  * {}\n", warning));
            }
        }

        let failed = result.failed_steps().count();
        let summary = format!("{} steps, {} failed", result.steps.len(), failed);
        output.push_str(&format!(
            "\n{} {}\n",
            "Summary:".cyan().bold(),
            if failed == 0 { summary.green() } else { summary.yellow() }
        ));
        output.push_str(&Self::footer());
        output
    }

    fn format_step(step: &FlowStep) -> String {
        let (marker, tool) = match (&step.tool, &step.error) {
            (None, _) => ("-".dimmed(), "note".dimmed()),
            (Some(tool), Some(_)) => ("✗".red().bold(), tool.red()),
            (Some(tool), None) => ("✓".green().bold(), tool.normal()),
        };

        let mut output = format!(
            "\n{} {} {} {}\n",
            format!("[{}]", step.ordinal).bold(),
            marker,
            tool,
            format!("on {}", step.subject.id).dimmed()
        );
        output.push_str(&format!("{}\n", Self::indent(&step.notes, "    ")));
        if let Some(error) = &step.error {
            output.push_str(&format!(
                "    {} {}\n",
                format!("{}:", error.code).red().bold(),
                error.message
            ));
        }
        output
    }

    /// Format a single tool result (payload only)
    pub fn format_result(result: &ToolResult) -> String {
        Self::format_json(&result.payload)
    }

    /// Format an error for the terminal
    pub fn format_error(error: &ToolError) -> String {
        format!("{} {}", format!("Error [{}]:", error.code()).red().bold(), error)
    }

    /// Format as JSON
    pub fn format_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    fn safety(safety: SafetyLevel) -> ColoredString {
        let label = safety.as_str();
        match safety {
            SafetyLevel::ReadOnly => label.green(),
            SafetyLevel::Write => label.yellow(),
            SafetyLevel::RiskyWrite => label.magenta(),
            SafetyLevel::Destructive => label.red().bold(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
