//! Output formatting utilities for CLI commands.

use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use stepgen_spec::{FileReport, RunSummary};

use crate::cli::{CommandContext, OutputFormat};
use crate::error::CliError;

/// Trait for types that can be formatted for output
pub trait FormattedOutput {
    fn format_text(&self) -> String;
    fn format_json(&self) -> Result<String, serde_json::Error>;
}

impl FormattedOutput for RunSummary {
    fn format_text(&self) -> String {
        let mut out = String::from("📊 Summary:\n");
        let _ = writeln!(out, "  - Processed {} feature file(s)", self.files_processed);
        let _ = writeln!(out, "  - Generated {} step definition file(s)", self.files_generated);
        let _ = writeln!(
            out,
            "  - Total unique step definitions across all files: {}",
            self.distinct_patterns
        );
        let _ = write!(out, "  - Unrecognized lines skipped: {}", self.skipped_lines);
        out
    }

    fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl FormattedOutput for FileReport {
    fn format_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "  Found {} step definitions", self.total_steps);
        let _ = writeln!(
            out,
            "  After deduplication: {} unique step definitions",
            self.unique_steps
        );
        let _ = writeln!(out, "✓ Generated: {}", self.output);
        let _ = writeln!(out, "  - Given: {}", self.given);
        let _ = writeln!(out, "  - When: {}", self.when);
        let _ = write!(out, "  - Then: {}", self.then);
        if self.skipped_lines > 0 {
            let _ = write!(out, "\n  - Skipped lines: {}", self.skipped_lines);
        }
        out
    }

    fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Print formatted output to stdout
pub fn print_output<T>(ctx: &CommandContext, value: &T) -> Result<(), CliError>
where
    T: FormattedOutput + Serialize,
{
    write_output(ctx, value, std::io::stdout().lock())
}

/// Print formatted output to a writer
pub fn write_output<T, W>(ctx: &CommandContext, value: &T, mut writer: W) -> Result<(), CliError>
where
    T: FormattedOutput + Serialize,
    W: Write,
{
    let output = match ctx.format {
        OutputFormat::Text => value.format_text(),
        OutputFormat::Json => value.format_json().map_err(|e| {
            CliError::Other(anyhow::anyhow!("JSON serialization failed: {}", e))
        })?,
    };

    writeln!(writer, "{}", output)?;
    Ok(())
}

/// Progress lines printed while a run is in flight
pub struct Progress<W: Write> {
    enabled: bool,
    writer: W,
}

impl Progress<std::io::Stdout> {
    pub fn stdout(ctx: &CommandContext) -> Self {
        Self::new(ctx.show_progress(), std::io::stdout())
    }
}

impl<W: Write> Progress<W> {
    pub fn new(enabled: bool, writer: W) -> Self {
        Self { enabled, writer }
    }

    fn line(&mut self, text: &str) -> Result<(), CliError> {
        if self.enabled {
            writeln!(self.writer, "{text}")?;
        }
        Ok(())
    }

    pub fn searching(&mut self, dir: &Path, extension: &str) -> Result<(), CliError> {
        self.line(&format!("Searching for .{extension} files in: {}", dir.display()))
    }

    pub fn found(&mut self, files: &[String]) -> Result<(), CliError> {
        self.line(&format!("Found {} feature file(s):", files.len()))?;
        for file in files {
            self.line(&format!("  - {file}"))?;
        }
        Ok(())
    }

    pub fn reading(&mut self, source: &str) -> Result<(), CliError> {
        self.line(&format!("\nReading: {source}"))
    }

    pub fn generated(&mut self, report: &FileReport) -> Result<(), CliError> {
        self.line(&report.format_text())
    }

    pub fn summary(&mut self, summary: &RunSummary) -> Result<(), CliError> {
        self.line(&format!("\n{}", summary.format_text()))
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
