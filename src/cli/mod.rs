pub mod checkout;
pub mod config;
pub mod quote;
pub mod submit;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "checkout", about = "Subscription checkout wizard for cloud storage plans.")]
pub struct Cli {
    /// Log at debug level
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the interactive checkout wizard (the default).
    Run,
    /// Price a subscription without placing an order.
    Quote {
        /// Storage size in GB: 3, 5, 10, 20, 30 or 50
        #[arg(long, default_value = "5")]
        size: u32,
        /// Duration in months: 3, 6 or 12
        #[arg(long, default_value = "12")]
        months: u32,
        /// Pay the whole term upfront for a discount
        #[arg(long)]
        upfront: bool,
    },
    /// Validate and confirm an order from a JSON file without the TUI.
    Submit {
        /// Path to the order JSON
        file: PathBuf,
    },
    /// Inspect or create the settings file.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective settings as JSON.
    Show,
    /// Print the settings file location.
    Path,
    /// Write a settings file with default values.
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
}
