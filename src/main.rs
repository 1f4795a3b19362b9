//! Telegram download bot - CLI entry point.
//!
//! Provides subcommands for running the bot, reporting failures and
//! cleaning links.

use anyhow::{Context, Result};
use clap::Parser;
use telegram_ytdl::cli::{Cli, Commands};
use telegram_ytdl::notify::LegOutcome;
use telegram_ytdl::{bot, clean_url, report_handler, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Bot => {
            bot::run().await.context("Failed to run Telegram bot")?;
        }
        Commands::Report => {
            let outcome = report_handler::run()
                .await
                .context("Failed to read failure report")?;
            if outcome.admin != LegOutcome::Delivered {
                anyhow::bail!("Administrator could not be notified");
            }
        }
        Commands::Clean { url } => {
            println!("{}", clean_url(&url));
        }
        Commands::Status => {
            print_status();
        }
    }

    Ok(())
}

/// Print configuration status.
fn print_status() {
    println!("📊 Telegram Download Bot Status\n");

    match Config::load(None) {
        Ok(config) => {
            println!("✅ Configuration: Found");
            println!("   Hostname: {}", config.hostname);
            println!("   Admin chat ID: {}", config.admin_chat_id);
            println!("   Error journal: {}", config.journal_path.display());
        }
        Err(e) => {
            println!("❌ Configuration: Not found or invalid");
            println!("   Error: {}", e);
            println!();
            println!("Create config at ~/.telegram-ytdl/config.json:");
            println!(r#"  {{"bot_token": "...", "admin_chat_id": "..."}}"#);
        }
    }
}
