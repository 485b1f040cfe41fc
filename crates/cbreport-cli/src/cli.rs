//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// cbreport - Summarize and report ClusterBuster benchmark runs
///
/// Reads the JSON record of a completed run and prints a column-aligned
/// text report or a machine-readable JSON summary.
#[derive(Parser, Debug)]
#[command(
    name = "cbreport",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose logging (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "CBREPORT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a report from a run document
    Report(ReportArgs),

    /// Manage configuration files and settings
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the report command
#[derive(Parser, Debug)]
pub struct ReportArgs {
    /// Path to the run document (JSON or YAML), or '-' for stdin
    #[arg(value_name = "RUN_FILE")]
    pub input: PathBuf,

    /// Report format (defaults to the configured format)
    #[arg(short, long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Output file path (stdout if not specified)
    #[arg(long = "save-to", value_name = "OUTPUT_FILE")]
    pub output_file: Option<PathBuf>,

    /// Row fields that nest the verbose Detail section, outermost first
    #[arg(long, value_delimiter = ',', value_name = "FIELD,...")]
    pub header: Option<Vec<String>>,

    /// Additional accumulator variable (dotted path); repeatable
    #[arg(long = "accumulator", value_name = "VAR")]
    pub accumulators: Vec<String>,

    /// Additional timeline variable (dotted path); repeatable
    #[arg(long = "timeline", value_name = "VAR")]
    pub timeline_vars: Vec<String>,

    /// List each instance's accumulator values in the verbose Detail section
    #[arg(long)]
    pub detail_metrics: bool,
}

impl ReportArgs {
    /// Whether the run document is read from stdin
    pub fn reads_stdin(&self) -> bool {
        self.input.as_os_str() == "-"
    }
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a configuration file with default values
    Init(ConfigInitArgs),

    /// Show the effective configuration
    Show(ConfigShowArgs),
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Initialize the user config instead of the project config (.cbreport.toml)
    #[arg(long)]
    pub user: bool,

    /// Force overwrite existing config files
    #[arg(long)]
    pub force: bool,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "toml")]
    pub format: ConfigFormat,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Report formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Overview and summary as aligned text
    Text,
    /// Overview, per-instance detail and summary as aligned text
    Verbose,
    /// Summary and run metadata as JSON
    JsonSummary,
    /// Summary, run metadata and per-instance rows as JSON
    Json,
    /// The whole run document plus the processed results as JSON
    JsonVerbose,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stderr().is_terminal()
    }
}

impl From<ReportFormat> for cbreport_core::ReportFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Text => cbreport_core::ReportFormat::Text,
            ReportFormat::Verbose => cbreport_core::ReportFormat::Verbose,
            ReportFormat::JsonSummary => cbreport_core::ReportFormat::JsonSummary,
            ReportFormat::Json => cbreport_core::ReportFormat::Json,
            ReportFormat::JsonVerbose => cbreport_core::ReportFormat::JsonVerbose,
        }
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
