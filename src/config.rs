//! Configuration management.
//!
//! Reads `~/.telegram-ytdl/config.json`:
//!
//! ```json
//! {"bot_token": "...", "admin_chat_id": "123456", "journal_path": "/var/log/ytdl/errors.jsonl"}
//! ```
//!
//! Falls back to environment variables if no config file exists.

use crate::error::ConfigError;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use teloxide::types::ChatId;

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs_config_dir().join("config.json")
}

/// Default error journal path.
pub fn default_journal_path() -> PathBuf {
    dirs_config_dir().join("errors.jsonl")
}

/// Get the .telegram-ytdl config directory path.
fn dirs_config_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".telegram-ytdl"))
        .unwrap_or_else(|| PathBuf::from(".telegram-ytdl"))
}

/// JSON configuration file structure.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    bot_token: String,
    admin_chat_id: ChatIdValue,
    #[serde(default)]
    journal_path: Option<PathBuf>,
}

/// Chat ID that can be either string or integer in JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ChatIdValue {
    String(String),
    Integer(i64),
}

impl ChatIdValue {
    fn to_chat_id(&self) -> Result<ChatId, ConfigError> {
        match self {
            ChatIdValue::String(s) => parse_chat_id(s, "admin_chat_id"),
            ChatIdValue::Integer(i) => Ok(ChatId(*i)),
        }
    }
}

fn parse_chat_id(value: &str, field: &str) -> Result<ChatId, ConfigError> {
    value
        .trim()
        .parse::<i64>()
        .map(ChatId)
        .map_err(|_| ConfigError::MissingField(format!("{} must be a valid integer", field)))
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// System hostname, shown in admin diagnostics
    pub hostname: String,
    /// Telegram bot token
    pub bot_token: String,
    /// Chat that receives every error diagnostic
    pub admin_chat_id: ChatId,
    /// Append-only JSON-lines file with one entry per reported failure
    pub journal_path: PathBuf,
}

impl Config {
    /// Load configuration from JSON file, falling back to environment variables.
    ///
    /// Search order:
    /// 1. Provided config_path (if any)
    /// 2. `~/.telegram-ytdl/config.json`
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            if path.exists() {
                return Self::from_json(&path);
            }
        }

        let default_path = default_config_path();
        if default_path.exists() {
            return Self::from_json(&default_path);
        }

        Self::from_env()
    }

    /// Load configuration from a JSON file.
    pub fn from_json(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let file: ConfigFile = serde_json::from_str(&content)?;

        if file.bot_token.is_empty() {
            return Err(ConfigError::MissingField("bot_token".to_string()));
        }

        Ok(Self {
            hostname: get_hostname(),
            bot_token: file.bot_token,
            admin_chat_id: file.admin_chat_id.to_chat_id()?,
            journal_path: file.journal_path.unwrap_or_else(default_journal_path),
        })
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Try to load .env file (silently ignore if not found)
        let _ = dotenvy::from_path(dirs_config_dir().join(".env"));

        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| ConfigError::MissingEnvVar("TELEGRAM_BOT_TOKEN".to_string()))?;

        let admin_chat_id = env::var("ADMIN_CHAT_ID")
            .map_err(|_| ConfigError::MissingEnvVar("ADMIN_CHAT_ID".to_string()))?;

        let journal_path = env::var("ERROR_JOURNAL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_journal_path());

        Ok(Self {
            hostname: get_hostname(),
            bot_token: token,
            admin_chat_id: parse_chat_id(&admin_chat_id, "ADMIN_CHAT_ID")?,
            journal_path,
        })
    }

    /// Whether `chat_id` is the administrator's chat.
    pub fn is_admin(&self, chat_id: ChatId) -> bool {
        self.admin_chat_id == chat_id
    }
}

/// Get system hostname.
fn get_hostname() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_with_string_chat_id() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        fs::write(
            &config_path,
            r#"{"bot_token":"test_token","admin_chat_id":"123456"}"#,
        )
        .unwrap();

        let config = Config::from_json(&config_path).unwrap();
        assert_eq!(config.bot_token, "test_token");
        assert_eq!(config.admin_chat_id, ChatId(123456));
        assert_eq!(config.journal_path, default_journal_path());
    }

    #[test]
    fn test_config_with_int_chat_id() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        fs::write(
            &config_path,
            r#"{"bot_token":"test_token","admin_chat_id":-100123456}"#,
        )
        .unwrap();

        let config = Config::from_json(&config_path).unwrap();
        assert_eq!(config.admin_chat_id, ChatId(-100123456));
    }

    #[test]
    fn test_config_with_journal_path() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        fs::write(
            &config_path,
            r#"{
                "bot_token": "token123",
                "admin_chat_id": 111222,
                "journal_path": "/tmp/ytdl/errors.jsonl"
            }"#,
        )
        .unwrap();

        let config = Config::from_json(&config_path).unwrap();
        assert_eq!(config.journal_path, PathBuf::from("/tmp/ytdl/errors.jsonl"));
        assert!(config.is_admin(ChatId(111222)));
        assert!(!config.is_admin(ChatId(42)));
    }

    #[test]
    fn test_config_missing_token() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        fs::write(&config_path, r#"{"admin_chat_id":"123456"}"#).unwrap();

        assert!(matches!(
            Config::from_json(&config_path),
            Err(ConfigError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_config_empty_token() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        fs::write(&config_path, r#"{"bot_token":"","admin_chat_id":1}"#).unwrap();

        assert!(matches!(
            Config::from_json(&config_path),
            Err(ConfigError::MissingField(_))
        ));
    }

    #[test]
    fn test_config_invalid_chat_id() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        fs::write(
            &config_path,
            r#"{"bot_token":"t","admin_chat_id":"@admin"}"#,
        )
        .unwrap();

        assert!(matches!(
            Config::from_json(&config_path),
            Err(ConfigError::MissingField(_))
        ));
    }

    #[test]
    fn test_config_file_not_found() {
        let result = Config::from_json(Path::new("/nonexistent/path.json"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }
}
