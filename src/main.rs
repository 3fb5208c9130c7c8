mod cli;
mod error;
mod fmt;
mod logging;
mod models;
mod pricing;
mod settings;
mod steps;
mod tui;
mod validation;
mod wizard;

use std::process::ExitCode;

use clap::Parser;

use cli::{Cli, Commands, ConfigCommands};
use error::Result;
use settings::{load_settings, Settings};

fn run_interactive(settings: &Settings) -> Result<()> {
    match cli::checkout::run(settings)? {
        Some(order) => {
            println!("Order confirmed");
            for line in wizard::order_lines(&order, &settings.pricing()) {
                println!("  {line}");
            }
        }
        None => println!("Checkout cancelled."),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = load_settings();

    let interactive = matches!(cli.command, None | Some(Commands::Run));
    let logging_handle = match logging::init_logging(&settings, interactive, cli.debug) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("Warning: logging disabled: {e}");
            None
        }
    };

    if cli.debug {
        if let Some(path) = logging_handle.as_ref().and_then(|h| h.log_file_path.as_ref()) {
            eprintln!("Logging to {}", path.display());
        }
    }

    let result = match cli.command {
        None | Some(Commands::Run) => run_interactive(&settings),
        Some(Commands::Quote {
            size,
            months,
            upfront,
        }) => cli::quote::run(size, months, upfront, &settings),
        Some(Commands::Submit { file }) => cli::submit::run(&file, &settings),
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => cli::config::show(),
            ConfigCommands::Path => cli::config::path(),
            ConfigCommands::Init { force } => cli::config::init(force),
        },
    };

    // Returning (rather than `process::exit`) drops the log guard and flushes it.
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
