//! Tongues CLI - translate from the command line with any configured engine
//!
//! This is the main entry point for the `tongues` binary. It loads the
//! engine configuration, builds the translator manager once and dispatches
//! to the command handlers.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use error::Result;
use logging::{redaction, timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::path::Path;
use std::process;
use tongues_core::TranslatorManager;
use tracing::instrument;
use tracing_appender::non_blocking::WorkerGuard;

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    control::set_override(cli.use_color());

    let log_guard = match init_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };

    let result = run(cli).await;

    // Flush buffered file logs before exiting
    drop(log_guard);

    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("{}", error::format_error(&e, control::SHOULD_COLORIZE.should_colorize()));

            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }

            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip(cli), fields(command = ?cli.command))]
async fn run(cli: Cli) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let mut output = OutputWriter::new(cli.output, cli.use_color(), cli.quiet);

    tracing::info!(verbosity = cli.verbosity_level(), "Executing command");

    match cli.command {
        Commands::Translate(args) => {
            let manager = load_manager(cli.config.as_deref())?;
            handlers::handle_translate(args, &manager, &mut output).await
        }
        Commands::Detect(args) => {
            let manager = load_manager(cli.config.as_deref())?;
            handlers::handle_detect(args, &manager, &mut output).await
        }
        Commands::Engines => {
            let manager = load_manager(cli.config.as_deref())?;
            handlers::handle_engines(&manager, &mut output)
        }
        Commands::StableId(args) => handlers::handle_stable_id(args, &mut output),
        Commands::Completions(args) => handlers::handle_completions(args),
    }
}

/// Load configuration and build every configured engine
fn load_manager(config_path: Option<&Path>) -> Result<TranslatorManager> {
    let config = {
        let _config_timer = Timer::new("config_loading");
        config::load_with_file(config_path)?
    };

    let mut logged = serde_json::to_value(&config)?;
    redaction::redact_json_value(&mut logged);
    tracing::debug!(config = %logged, "Configuration loaded");

    // The in-memory store is created by the registry when `cache.enabled` is set
    Ok(TranslatorManager::from_config(&config, None)?)
}

/// Initialize the logging system
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());

    logging_config.merge_with_env();

    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}
