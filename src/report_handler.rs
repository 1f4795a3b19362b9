//! Report handler for failures raised outside the bot process.
//!
//! Reads a JSON failure from stdin (e.g. from a cron job wrapping the
//! extraction tool) and routes it through the notification pipeline.

use crate::config::Config;
use crate::error::ReportError;
use crate::notify::telegram::TelegramTransport;
use crate::notify::{DeliveryOutcome, Failure, FailureKind, FileJournal, Notifier};
use serde::Deserialize;
use std::io::{self, Read};
use std::sync::Arc;
use teloxide::types::ChatId;

/// Failure report read from stdin.
#[derive(Debug, Deserialize)]
pub struct ReportInput {
    /// Free-text context (command line, URL, job name)
    #[serde(default)]
    pub context: Option<String>,
    /// Error message or captured stderr
    #[serde(default)]
    pub message: String,
    /// Private chat of the user whose request failed, if any
    #[serde(default)]
    pub user_chat_id: Option<i64>,
}

impl ReportInput {
    /// Convert into a failure. An empty message is replaced by a placeholder.
    pub fn into_failure(self) -> Failure {
        let message = if self.message.trim().is_empty() {
            "(no details)".to_string()
        } else {
            self.message
        };

        Failure {
            kind: FailureKind::External,
            context: self.context.filter(|c| !c.trim().is_empty()),
            message,
            private_chat: self.user_chat_id.map(ChatId),
        }
    }
}

/// Send the report through a notifier built from `config`.
pub async fn send_report(config: &Config, input: ReportInput) -> DeliveryOutcome {
    let notifier = Notifier::new(
        Arc::new(TelegramTransport::new(&config.bot_token)),
        Arc::new(FileJournal::new(config.journal_path.clone())),
        config.admin_chat_id,
        config.hostname.clone(),
    );

    notifier.handle_failure(input.into_failure()).await
}

/// Read JSON input from stdin.
fn read_stdin() -> Result<String, io::Error> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

/// Main entry point for the report handler.
pub async fn run() -> Result<DeliveryOutcome, ReportError> {
    let input_str = read_stdin()?;
    let input: ReportInput = serde_json::from_str(&input_str)?;

    let config = Config::load(None)?;

    Ok(send_report(&config, input).await)
}
