//! Shared types for the error notification pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use teloxide::types::{Chat, ChatId};

/// What went wrong, as shown to the administrator.
///
/// `recipient_chat` is set only when the failure originated in a one-to-one
/// chat; group chats never receive an apology.
#[derive(Debug, Clone, Default)]
pub struct ErrorReport {
    pub recipient_chat: Option<ChatId>,
    pub context_label: Option<String>,
    pub diagnostic_text: Option<String>,
}

impl ErrorReport {
    /// Recipient for the apology, if `chat` is a private chat.
    pub fn recipient_for(chat: &Chat) -> Option<ChatId> {
        chat.is_private().then_some(chat.id)
    }
}

/// Where a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A message handler returned an error
    Handler,
    /// A bot command failed
    Command,
    /// Reported from outside the bot process (`report` subcommand)
    External,
}

impl FailureKind {
    /// Title of the admin diagnostic.
    pub fn title(self) -> &'static str {
        match self {
            FailureKind::Handler => "⚠️ Handler error",
            FailureKind::Command => "⚠️ Command failed",
            FailureKind::External => "📢 Reported error",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Handler => "handler",
            FailureKind::Command => "command",
            FailureKind::External => "external",
        };
        f.write_str(name)
    }
}

/// A caught failure on its way to the notification pipeline.
#[derive(Debug, Clone)]
pub struct Failure {
    pub kind: FailureKind,
    pub context: Option<String>,
    pub message: String,
    pub private_chat: Option<ChatId>,
}

impl Failure {
    /// Create a failure with no context and no user to apologise to.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            context: None,
            message: message.into(),
            private_chat: None,
        }
    }

    /// Attach a free-text context label (command, URL, update kind).
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Apologise to the originating chat if it is a private one.
    pub fn in_chat(mut self, chat: &Chat) -> Self {
        self.private_chat = ErrorReport::recipient_for(chat);
        self
    }
}

/// Result of a single delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegOutcome {
    Delivered,
    Failed,
    Skipped,
}

/// What happened to each leg of one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub admin: LegOutcome,
    pub user: LegOutcome,
    pub journal: LegOutcome,
}

/// One line of the error journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub incident_id: String,
    /// Seconds since the Unix epoch
    pub timestamp: u64,
    pub kind: FailureKind,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}
