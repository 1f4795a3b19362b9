//! Error notification pipeline.
//!
//! Every failure produces up to three independent side effects: a diagnostic
//! for the administrator, an apology for the user (private chats only) and a
//! journal entry. Each is attempted on its own; a failing one is logged and
//! never affects the others or the caller.

mod types;

pub mod journal;
pub mod telegram;

pub use journal::{ErrorJournal, FileJournal};
pub use types::{
    DeliveryOutcome, ErrorReport, Failure, FailureKind, JournalEntry, LegOutcome,
};

use crate::error::DeliveryError;
use crate::format::{
    bold, bound_message, bound_message_to, code, escape_html, MAX_BODY_LENGTH,
    TELEGRAM_MESSAGE_LIMIT,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use teloxide::types::ChatId;

/// Sent to a user whose request failed in a private chat.
pub const USER_APOLOGY: &str =
    "😔 Sorry, something went wrong while handling your request. The administrator has been notified.";

/// Longest context line kept in an admin diagnostic, in characters.
const MAX_CONTEXT_LENGTH: usize = 512;

/// Abstraction over the channel that delivers formatted messages.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a message in the HTML parse mode.
    async fn send_html(&self, chat_id: ChatId, text: &str) -> Result<(), DeliveryError>;

    /// Get the platform name for logging purposes.
    fn platform_name(&self) -> &'static str;
}

/// Build the administrator's diagnostic.
///
/// Parts are the bold title, the HTML-escaped context line and the bounded
/// details in a code span, separated by blank lines. Empty parts are left out. Details
/// are bounded before wrapping; if code escaping still pushes the message
/// over Telegram's ceiling, the bound shrinks until it fits.
pub fn format_admin_message(title: &str, context: Option<&str>, details: Option<&str>) -> String {
    let header = bold(&escape_html(title));
    let context = context
        .filter(|c| !c.trim().is_empty())
        .map(|c| escape_html(&bound_message_to(c, MAX_CONTEXT_LENGTH)));
    let details = details.filter(|d| !d.trim().is_empty());

    let assemble = |details: Option<String>| {
        let mut parts = vec![header.clone()];
        parts.extend(context.clone());
        parts.extend(details.filter(|d| !d.is_empty()).map(|d| code(&d)));
        parts.join("\n\n")
    };

    let mut limit = MAX_BODY_LENGTH;
    let mut message = assemble(details.map(bound_message));
    loop {
        let length = message.chars().count();
        if length <= TELEGRAM_MESSAGE_LIMIT || limit == 0 {
            return message;
        }
        limit = (limit * TELEGRAM_MESSAGE_LIMIT / length).min(limit - 1);
        message = assemble(details.map(|d| bound_message_to(d, limit)));
    }
}

fn new_incident_id() -> String {
    uuid::Uuid::new_v4().to_string()[..8].to_string()
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Routes failures to the administrator, the user and the journal.
#[derive(Clone)]
pub struct Notifier {
    transport: Arc<dyn Transport>,
    journal: Arc<dyn ErrorJournal>,
    admin_chat_id: ChatId,
    hostname: String,
}

impl Notifier {
    pub fn new(
        transport: Arc<dyn Transport>,
        journal: Arc<dyn ErrorJournal>,
        admin_chat_id: ChatId,
        hostname: String,
    ) -> Self {
        Self {
            transport,
            journal,
            admin_chat_id,
            hostname,
        }
    }

    pub fn journal(&self) -> &Arc<dyn ErrorJournal> {
        &self.journal
    }

    /// Entry point for caught failures. Never fails.
    ///
    /// Tags the failure with an incident id and the host name, dispatches it
    /// like [`Notifier::report_error`] and appends it to the journal.
    pub async fn handle_failure(&self, failure: Failure) -> DeliveryOutcome {
        let incident_id = new_incident_id();

        tracing::warn!(
            incident = %incident_id,
            kind = %failure.kind,
            context = failure.context.as_deref().unwrap_or(""),
            "Reporting failure: {}",
            failure.message
        );

        let mut context = format!("Host: {} | Incident: {}", self.hostname, incident_id);
        if let Some(label) = &failure.context {
            context = format!("{} | {}", label, context);
        }

        let report = ErrorReport {
            recipient_chat: failure.private_chat,
            context_label: Some(context),
            diagnostic_text: Some(failure.message.clone()),
        };

        let entry = JournalEntry {
            incident_id,
            timestamp: unix_timestamp(),
            kind: failure.kind,
            context: failure.context,
            details: Some(failure.message),
        };

        self.dispatch(failure.kind.title(), report, Some(entry)).await
    }

    /// Send an explicit error report. Never fails.
    pub async fn report_error(&self, title: &str, report: ErrorReport) -> DeliveryOutcome {
        self.dispatch(title, report, None).await
    }

    async fn dispatch(
        &self,
        title: &str,
        report: ErrorReport,
        entry: Option<JournalEntry>,
    ) -> DeliveryOutcome {
        let admin_text = format_admin_message(
            title,
            report.context_label.as_deref(),
            report.diagnostic_text.as_deref(),
        );

        let admin_leg = self.send_isolated(self.admin_chat_id, &admin_text, "admin");
        let user_leg = async {
            match report.recipient_chat {
                Some(chat_id) => self.send_isolated(chat_id, USER_APOLOGY, "user").await,
                None => LegOutcome::Skipped,
            }
        };
        let journal_leg = async {
            match &entry {
                Some(entry) => self.record_isolated(entry).await,
                None => LegOutcome::Skipped,
            }
        };

        let (admin, user, journal) = tokio::join!(admin_leg, user_leg, journal_leg);

        DeliveryOutcome {
            admin,
            user,
            journal,
        }
    }

    async fn send_isolated(&self, chat_id: ChatId, text: &str, leg: &str) -> LegOutcome {
        match self.transport.send_html(chat_id, text).await {
            Ok(()) => LegOutcome::Delivered,
            Err(e) => {
                tracing::error!(
                    leg = leg,
                    chat_id = chat_id.0,
                    platform = self.transport.platform_name(),
                    "Failed to deliver error notification: {}",
                    e
                );
                LegOutcome::Failed
            }
        }
    }

    async fn record_isolated(&self, entry: &JournalEntry) -> LegOutcome {
        match self.journal.record(entry).await {
            Ok(()) => LegOutcome::Delivered,
            Err(e) => {
                tracing::warn!(
                    incident = %entry.incident_id,
                    "Failed to write error journal: {}",
                    e
                );
                LegOutcome::Failed
            }
        }
    }
}
