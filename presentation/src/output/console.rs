//! Console output formatter for run reports

use crate::output::formatter::OutputFormatter;
use crate::output::report::RunReport;
use colored::Colorize;

/// Formats run reports for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete run report
    pub fn format(report: &RunReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("luaglue"));
        output.push('\n');

        if !report.scripting_available {
            output.push_str(&format!(
                "\n{} built without Lua scripting support\n",
                "Note:".yellow().bold()
            ));
        }

        // Scripts
        output.push_str(&Self::section_header("Scripts"));
        if report.loaded.is_empty() && report.failed.is_empty() {
            output.push_str(&format!("  {}\n", "(none loaded)".dimmed()));
        }
        for path in &report.loaded {
            output.push_str(&format!("  {} {}\n", "ok".green().bold(), path));
        }
        for failed in &report.failed {
            output.push_str(&format!(
                "  {} {}\n{}\n",
                "failed".red().bold(),
                failed.path,
                Self::indent(&failed.error, "      ")
            ));
        }

        // Emissions (if any)
        if !report.emissions.is_empty() {
            output.push_str(&Self::section_header("Emitted"));
            for emission in &report.emissions {
                match (&emission.invoked, &emission.error) {
                    (_, Some(error)) => output.push_str(&format!(
                        "  {} {}\n{}\n",
                        emission.event.red().bold(),
                        "failed".red(),
                        Self::indent(error, "      ")
                    )),
                    (Some(invoked), None) => output.push_str(&format!(
                        "  {} {} listener(s)\n",
                        emission.event.yellow().bold(),
                        invoked
                    )),
                    (None, None) => {}
                }
            }
        }

        // Listener table (if requested)
        if let Some(events) = &report.events {
            output.push_str(&Self::section_header("Listeners"));
            if events.is_empty() {
                output.push_str(&format!("  {}\n", "(no listeners)".dimmed()));
            }
            for entry in events {
                output.push_str(&format!("  {:<24} {}\n", entry.event, entry.listeners));
            }
        }

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(report: &RunReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format configuration file locations and the effective configuration
    /// (for `--show-config`).
    pub fn format_config(sources: &[(&str, String, bool)], effective: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n", "Configuration files:".cyan().bold()));
        for (label, path, found) in sources {
            let status = if *found {
                "found".green()
            } else {
                "not found".dimmed()
            };
            output.push_str(&format!("  {:<9} {} ({})\n", format!("{}:", label), path, status));
        }

        output.push_str(&format!("\n{}\n", "Effective configuration:".cyan().bold()));
        output.push_str(effective);
        if !effective.ends_with('\n') {
            output.push('\n');
        }

        output
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

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, report: &RunReport) -> String {
        Self::format(report)
    }

    fn format_json(&self, report: &RunReport) -> String {
        Self::format_json(report)
    }
}
