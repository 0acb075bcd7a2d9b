//! Output formatting and writing utilities
//!
//! Human output is line oriented and optionally colored. The machine
//! formats (JSON, YAML) serialize one value per command.

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::logging::redaction;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;
use serde::Serialize;
use std::io::{self, Write};
use std::time::Duration;
use tracing::trace;

/// Trait for turning a value into text in a given format
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty | OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }
}

/// Output writer that handles formatting and writing
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self {
            format,
            use_color,
            show_progress: !quiet && format == OutputFormat::Human && io::stderr().is_terminal(),
            quiet,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    #[cfg(test)]
    pub fn with_writer(format: OutputFormat, use_color: bool, quiet: bool, writer: Box<dyn Write>) -> Self {
        Self {
            format,
            use_color,
            show_progress: false, // No progress bars with custom writers
            quiet,
            writer,
        }
    }

    /// Whether human-readable lines should be written
    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a result line, the main output of a command
    ///
    /// Shown even in quiet mode.
    pub fn result(&mut self, label: &str, content: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", format!("[{}]", label).green(), content))
        } else {
            self.writeln(&format!("[{}] {}", label, content))
        }
    }

    /// Write a secondary note under a result line
    pub fn comment(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("  {}", message.dimmed()))
        } else {
            self.writeln(&format!("  {}", message))
        }
    }

    /// Write an error for one engine without aborting the command
    pub fn error(&mut self, label: &str, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", format!("[{}]", label).red(), message.red()))
        } else {
            self.writeln(&format!("[{}] ERROR: {}", label, message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured machine format
    ///
    /// Human output is written line by line by the handlers instead.
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        if self.is_human() {
            return Ok(());
        }

        let mut logged = serde_json::to_value(value)?;
        redaction::redact_json_value(&mut logged);
        trace!(data = %logged, "Writing structured output");

        let formatted = self.format.format(value)?;
        write!(self.writer, "{}", formatted)?;
        if !formatted.ends_with('\n') {
            writeln!(self.writer)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Write a table (for human format)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
        for row in &rows {
            for (i, cell) in row.iter().enumerate().take(widths.len()) {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let header_row = pad_row(headers.iter().map(|h| h.to_string()), &widths);
        if self.use_color {
            self.writeln(&header_row.bold().to_string())?;
        } else {
            self.writeln(&header_row)?;
        }

        let separator = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        self.writeln(&separator)?;

        for row in rows {
            self.writeln(&pad_row(row.into_iter(), &widths))?;
        }

        Ok(())
    }

    /// Create a spinner for indeterminate progress
    pub fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(default_spinner_style());
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }
}

fn pad_row(cells: impl Iterator<Item = String>, widths: &[usize]) -> String {
    cells
        .enumerate()
        .map(|(i, cell)| match widths.get(i) {
            Some(width) => format!("{:width$}", cell, width = width),
            None => cell,
        })
        .collect::<Vec<_>>()
        .join(" │ ")
        .trim_end()
        .to_string()
}

/// Spinner drawn on stderr so stdout stays clean for piping
pub fn default_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}
