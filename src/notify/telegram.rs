//! Telegram transport for the notification pipeline.

use super::Transport;
use crate::error::DeliveryError;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};

/// Sends HTML-formatted messages through the Bot API.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    /// Create a transport with its own bot client.
    pub fn new(bot_token: &str) -> Self {
        Self {
            bot: Bot::new(bot_token),
        }
    }

    /// Reuse an existing bot client (e.g. the dispatcher's).
    pub fn from_bot(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_html(&self, chat_id: ChatId, text: &str) -> Result<(), DeliveryError> {
        self.bot
            .send_message(chat_id, text)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }

    fn platform_name(&self) -> &'static str {
        "Telegram"
    }
}
