//! CLI argument parsing with subcommands.

use clap::{Parser, Subcommand};

/// Telegram download bot with admin error reporting.
#[derive(Parser)]
#[command(name = "telegram-ytdl")]
#[command(about = "Telegram download bot with admin error reporting")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run the Telegram bot
    Bot,

    /// Report a failure to the administrator (reads JSON from stdin)
    Report,

    /// Strip tracking parameters from a link and print it
    Clean {
        /// Link to clean
        url: String,
    },

    /// Show current configuration status
    Status,
}
