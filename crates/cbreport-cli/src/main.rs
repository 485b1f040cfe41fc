//! cbreport CLI - Command-line interface for ClusterBuster run reports
//!
//! This is the main entry point for the cbreport CLI application, providing
//! commands for producing text and JSON reports from run documents and for
//! managing configuration.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;
use tracing_appender::non_blocking::WorkerGuard;

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    // Set up colored output
    control::set_override(cli.use_color());

    let code = match execute(cli) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{}", error::format_error(&e, control::SHOULD_COLORIZE.should_colorize()));
            e.exit_code()
        }
    };

    process::exit(code);
}

/// Load configuration, start logging and run the command
///
/// The logging guard lives until this returns so file logs are flushed
/// before the process exits.
fn execute(cli: Cli) -> Result<()> {
    let config = Config::load_with_file(cli.config.as_deref())?;

    let _guard: Option<WorkerGuard> = match init_logging(&cli, &config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };

    run(cli, &config)
}

/// Main application logic
#[instrument(skip_all, fields(command = ?cli.command))]
fn run(cli: Cli, config: &Config) -> Result<()> {
    let _timer = Timer::new("cli_execution");
    let _entered = _timer.enter();

    let use_color = cli.use_color() && config.output.color;
    let mut output = OutputWriter::new(use_color, cli.quiet, cli.verbosity_level());

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    match cli.command {
        Commands::Report(args) => handlers::handle_report(args, config, &mut output),
        Commands::Config(args) => handlers::handle_config(args, config, &mut output),
        Commands::Completions(args) => handlers::handle_completions(args, &mut std::io::stdout()),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: &Config) -> Result<Option<WorkerGuard>> {
    // Create logging configuration from CLI args, the config file and environment
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());
    logging_config.apply_file_settings(&config.logging, cli.verbosity_level());
    logging_config.merge_with_env();

    // If quiet mode, only log errors
    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging_config.console = logging_config.console && cli.use_color();

    logging::init_logging(logging_config)
}
