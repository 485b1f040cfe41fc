//! Logging utilities for the cbreport CLI
//!
//! This module provides:
//! - Report ID generation and tracking
//! - Sensitive data redaction
//! - Performance timing spans
//! - Structured logging setup
//! - Multiple output formats (console, JSON)
//!
//! Logs always go to stderr or a log file so that report output on stdout
//! stays machine-readable.

use crate::config;
use crate::error::{Error, Result};
use is_terminal::IsTerminal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::{field, Span};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Global report ID for the current invocation
static REPORT_ID: OnceLock<String> = OnceLock::new();

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter
    pub level: String,
    /// Output format: compact, full, json
    pub format: LogFormat,
    /// Enable ANSI colors on the console
    pub console: bool,
    /// Optional file output path
    pub file: Option<PathBuf>,
    /// Include thread IDs
    pub thread_ids: bool,
    /// Include file and line numbers
    pub source_location: bool,
    /// Include span events
    pub span_events: bool,
    /// Module-based filtering
    pub module_filter: Option<HashMap<String, String>>,
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact format for production
    Compact,
    /// Full format with all details
    Full,
    /// JSON structured format
    Json,
}

impl LogFormat {
    fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "compact" => Some(LogFormat::Compact),
            "full" => Some(LogFormat::Full),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            console: true,
            file: None,
            thread_ids: false,
            source_location: false,
            span_events: false,
            module_filter: None,
        }
    }
}

impl LoggingConfig {
    /// Create logging config from verbosity level
    pub fn from_verbosity(verbosity: u8) -> Self {
        let mut config = Self::default();

        match verbosity {
            0 => {
                config.level = "warn".to_string();
            }
            1 => {
                config.level = "info".to_string();
            }
            2 => {
                config.level = "debug".to_string();
                config.source_location = true;
            }
            _ => {
                config.level = "trace".to_string();
                config.format = LogFormat::Full;
                config.source_location = true;
                config.thread_ids = true;
                config.span_events = true;
            }
        }

        config
    }

    /// Apply the `[logging]` section of the configuration file
    ///
    /// The file's level only applies when no `-v` flag raised verbosity.
    pub fn apply_file_settings(&mut self, settings: &config::LoggingConfig, verbosity: u8) {
        if verbosity == 0 {
            if let Some(level) = &settings.level {
                self.level = level.clone();
            }
        }
        match LogFormat::parse(&settings.format) {
            Some(format) => self.format = format,
            None => eprintln!("Warning: Invalid log format '{}' in config, using default", settings.format),
        }
        if settings.file.is_some() {
            self.file = settings.file.clone();
        }
    }

    /// Apply environment overrides
    pub fn merge_with_env(&mut self) {
        // RUST_LOG takes precedence
        if let Ok(rust_log) = std::env::var("RUST_LOG") {
            self.level = rust_log;
        }

        if let Ok(format) = std::env::var("CBREPORT_LOG_FORMAT") {
            match LogFormat::parse(&format) {
                Some(format) => self.format = format,
                None => eprintln!("Warning: Invalid log format: {}, using default", format),
            }
        }

        if let Ok(file) = std::env::var("CBREPORT_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
    }
}

/// Initialize the global logging system
///
/// When logging to a file, the returned guard must be held until exit so
/// buffered records are flushed.
pub fn init_logging(config: LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = create_env_filter(&config)?;

    let (writer, guard, ansi) = match &config.file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| Error::config(format!("Invalid log file path: {}", path.display())))?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard), false)
        }
        None => (
            BoxMakeWriter::new(std::io::stderr),
            None,
            config.console && std::io::stderr().is_terminal(),
        ),
    };

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(config.thread_ids)
        .with_file(config.source_location)
        .with_line_number(config.source_location)
        .with_span_events(span_events);

    // Each format produces a different subscriber type
    let installed = match config.format {
        LogFormat::Compact => {
            tracing::subscriber::set_global_default(builder.with_ansi(ansi).compact().finish())
        }
        LogFormat::Json => tracing::subscriber::set_global_default(builder.with_ansi(false).json().finish()),
        LogFormat::Full => tracing::subscriber::set_global_default(builder.with_ansi(ansi).finish()),
    };
    installed.map_err(|e| Error::other(format!("Failed to initialize logging: {}", e)))?;

    let report_id = generate_report_id();
    REPORT_ID
        .set(report_id.clone())
        .map_err(|_| Error::other("Failed to set report ID - report tracking may not work correctly"))?;

    tracing::info!(
        report_id = %report_id,
        config = ?config,
        "Logging system initialized"
    );

    Ok(guard)
}

/// Create environment filter based on configuration
fn create_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let mut filter = EnvFilter::try_new(&config.level)
        .map_err(|e| Error::config(format!("Invalid log level '{}': {}", config.level, e)))?;

    if let Some(module_filters) = &config.module_filter {
        for (module, level) in module_filters {
            filter = filter.add_directive(
                format!("{}={}", module, level)
                    .parse()
                    .map_err(|e| Error::other(format!("Invalid filter directive: {}", e)))?,
            );
        }
    }

    Ok(filter)
}

/// Generate a unique ID for this invocation
pub fn generate_report_id() -> String {
    format!("rpt_{}", Uuid::new_v4().simple())
}

/// Get the current report ID
pub fn current_report_id() -> Option<&'static str> {
    REPORT_ID.get().map(|s| s.as_str())
}

/// Create a span with report ID and timing
pub fn create_operation_span(operation: &str, details: Option<&str>) -> Span {
    tracing::info_span!(
        "operation",
        operation = operation,
        report_id = current_report_id().unwrap_or("unknown"),
        details = details.unwrap_or(""),
        duration_ms = field::Empty,
    )
}

/// Credential scrubbing for run documents
///
/// ClusterBuster records its expanded command line, where options such as
/// `--pull-secret-token=...` or `--password=...` appear either as a single
/// `--option=value` word or as an option word followed by its value.
pub mod redaction {
    use regex::Regex;
    use serde_json::Value;
    use std::sync::OnceLock;

    const MASK: &str = "***";

    static CREDENTIAL_OPTION: OnceLock<Regex> = OnceLock::new();

    fn credential_option() -> &'static Regex {
        CREDENTIAL_OPTION.get_or_init(|| {
            Regex::new(r"(?i)(--[a-z0-9-]*(?:token|password|secret)[a-z0-9-]*)(=|\s+)(\S+)")
                .expect("valid credential option pattern")
        })
    }

    /// Whether a command-line word is a credential option awaiting its value
    fn is_bare_credential_option(word: &str) -> bool {
        word.starts_with("--") && !word.contains('=') && is_credential_name(word)
    }

    fn is_credential_name(name: &str) -> bool {
        let name = name.to_lowercase();
        ["token", "password", "secret"].iter().any(|marker| name.contains(marker))
    }

    /// Mask the values of credential options in a command-line string
    pub fn redact_sensitive(input: &str) -> String {
        credential_option()
            .replace_all(input, format!("${{1}}${{2}}{}", MASK).as_str())
            .into_owned()
    }

    /// Mask credentials anywhere in a JSON document
    ///
    /// Object keys naming a credential have their whole value masked. In
    /// arrays, the word after a bare credential option is masked too.
    pub fn redact_json_value(value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    if is_credential_name(key) {
                        *val = Value::String(MASK.to_string());
                    } else {
                        redact_json_value(val);
                    }
                }
            }
            Value::Array(items) => {
                let mut mask_next = false;
                for item in items.iter_mut() {
                    if mask_next {
                        *item = Value::String(MASK.to_string());
                        mask_next = false;
                        continue;
                    }
                    mask_next = item.as_str().is_some_and(is_bare_credential_option);
                    redact_json_value(item);
                }
            }
            Value::String(text) => *text = redact_sensitive(text),
            _ => {}
        }
    }
}

/// Operation timing
pub mod timing {
    use std::time::Instant;
    use tracing::Span;

    /// Records `duration_ms` on its operation span when dropped
    pub struct Timer {
        start: Instant,
        span: Span,
    }

    impl Timer {
        pub fn new(operation: &str) -> Self {
            Self::start(super::create_operation_span(operation, None))
        }

        pub fn with_details(operation: &str, details: &str) -> Self {
            Self::start(super::create_operation_span(operation, Some(details)))
        }

        fn start(span: Span) -> Self {
            Self {
                start: Instant::now(),
                span,
            }
        }

        /// Enter the timer's span for the rest of the scope
        pub fn enter(&self) -> tracing::span::Entered<'_> {
            self.span.enter()
        }

        pub fn elapsed_ms(&self) -> u64 {
            self.start.elapsed().as_millis() as u64
        }
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            let duration_ms = self.elapsed_ms();
            self.span.record("duration_ms", duration_ms);
            self.span.in_scope(|| tracing::debug!(duration_ms, "Operation completed"));
        }
    }
}
