//! Telegram download bot library.
//!
//! Formatting of outbound messages for Telegram's HTML parse mode, link
//! cleaning, and the pipeline that reports failures to the administrator.

pub mod bot;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod notify;
pub mod report_handler;
pub mod url_clean;

// Re-export commonly used types
pub use config::Config;
pub use notify::{DeliveryOutcome, ErrorReport, Failure, FailureKind, Notifier, Transport};
pub use url_clean::clean_url;
