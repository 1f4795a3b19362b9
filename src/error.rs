//! Error types for the application.

use std::path::PathBuf;
use thiserror::Error;

/// Errors related to configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// Errors raised when a message cannot be delivered.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Transport unavailable: {0}")]
    Unavailable(String),
}

/// Errors related to the error journal.
#[derive(Error, Debug)]
pub enum JournalError {
    #[error("Failed to write journal: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON in journal: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Errors raised before a failure report reaches the notification pipeline.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to read stdin: {0}")]
    StdinError(#[from] std::io::Error),

    #[error("Invalid report input: {0}")]
    InvalidInput(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),
}
