//! Output formatting and writing utilities
//!
//! Reports and data go to stdout; status messages go to stderr so that a
//! report can be piped into another tool while progress stays visible.

use crate::cli::ConfigFormat;
use crate::error::Result;
use crate::logging::redaction;
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};
use tracing::{debug, trace};

/// Trait for formatting serializable values
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;
}

impl OutputFormatter for ConfigFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            ConfigFormat::Toml => Ok(toml::to_string_pretty(value)?),
            ConfigFormat::Json => Ok(serde_json::to_string_pretty(value)?),
            ConfigFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }
}

/// Output writer that handles report output and colored status messages
pub struct OutputWriter {
    use_color: bool,
    quiet: bool,
    verbose: u8,
    writer: Box<dyn Write>,
    status: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout and stderr
    pub fn new(use_color: bool, quiet: bool, verbose: u8) -> Self {
        Self::with_writers(use_color, quiet, verbose, Box::new(io::stdout()), Box::new(io::stderr()))
    }

    /// Create an output writer with custom writers
    pub fn with_writers(
        use_color: bool,
        quiet: bool,
        verbose: u8,
        writer: Box<dyn Write>,
        status: Box<dyn Write>,
    ) -> Self {
        Self {
            use_color,
            quiet,
            verbose,
            writer,
            status,
        }
    }

    /// Write a rendered report, terminated by exactly one newline
    pub fn report(&mut self, content: &str) -> Result<()> {
        self.writer.write_all(content.as_bytes())?;
        if !content.ends_with('\n') {
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Write data in the given format
    pub fn data<T: Serialize>(&mut self, value: &T, format: ConfigFormat) -> Result<()> {
        let mut value_json = serde_json::to_value(value)?;
        redaction::redact_json_value(&mut value_json);
        trace!(
            "Outputting data: {}",
            serde_json::to_string(&value_json).unwrap_or_else(|_| "[failed to serialize]".to_string())
        );

        let formatted = format.format(value)?;
        self.report(&formatted)
    }

    /// Write a line to the status stream
    fn status_line(&mut self, content: &str) -> Result<()> {
        writeln!(self.status, "{}", content)?;
        self.status.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        debug!("Output info: {}", message);

        if self.quiet {
            return Ok(());
        }

        if self.use_color {
            self.status_line(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.status_line(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.use_color {
            self.status_line(&message.green().to_string())
        } else {
            self.status_line(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.use_color {
            self.status_line(&message.yellow().to_string())
        } else {
            self.status_line(&format!("WARNING: {}", message))
        }
    }

    /// Write an error message
    pub fn error(&mut self, message: &str) -> Result<()> {
        if self.use_color {
            self.status_line(&message.red().to_string())
        } else {
            self.status_line(&format!("ERROR: {}", message))
        }
    }

    /// Write debug information if verbose mode is enabled
    pub fn debug(&mut self, message: &str) -> Result<()> {
        if self.verbose == 0 {
            return Ok(());
        }
        if self.use_color {
            self.status_line(&format!("{} {}", "DEBUG:".dimmed(), message.dimmed()))
        } else {
            self.status_line(&format!("DEBUG: {}", message))
        }
    }
}
