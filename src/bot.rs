//! Long-running Telegram bot.
//!
//! Every handler error is turned into a [`Failure`] and reported through the
//! [`Notifier`]; nothing a handler returns reaches the dispatcher as an error.

use crate::config::Config;
use crate::format::{
    bold, bound_message_to, code, escape_html, escape_html_attr, italic, link, Fragment,
};
use crate::notify::telegram::TelegramTransport;
use crate::notify::{Failure, FailureKind, FileJournal, JournalEntry, Notifier};
use crate::url_clean::{clean_url, find_and_clean_url};
use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{BotCommandScope, ParseMode, Recipient};
use teloxide::utils::command::BotCommands;

/// Number of journal entries listed by `/journal`.
const JOURNAL_TAIL: usize = 5;

/// Longest first line of details shown per `/journal` entry.
const JOURNAL_SUMMARY_LENGTH: usize = 160;

const CLEAN_USAGE: &str = "Usage: /clean <link>";

/// Available bot commands.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Show the welcome message")]
    Start,
    #[command(description = "Show help")]
    Help,
    #[command(description = "Strip tracking parameters from a link")]
    Clean(String),
    #[command(description = "Show recent errors (admin only)")]
    Journal,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Start => "/start",
            Command::Help => "/help",
            Command::Clean(_) => "/clean",
            Command::Journal => "/journal",
        }
    }
}

async fn reply_html(bot: &Bot, msg: &Message, text: String) -> ResponseResult<()> {
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Handle the /start command.
async fn start_handler(bot: &Bot, msg: &Message) -> ResponseResult<()> {
    let name = msg
        .from
        .as_ref()
        .map(|user| user.first_name.clone())
        .unwrap_or_else(|| "there".to_string());

    let mut fragments = vec![Fragment::Bold(format!("👋 Hi, {}!", name))];
    fragments.push(Fragment::Plain(
        "\n\nSend me a link and I will fetch the media for you.".to_string(),
    ));

    reply_html(bot, msg, Fragment::render_all(&fragments)).await
}

/// Handle the /help command.
async fn help_handler(bot: &Bot, msg: &Message) -> ResponseResult<()> {
    let text = format!(
        "{}\n\n{}\n\n{}",
        bold("📖 Help"),
        escape_html(&Command::descriptions().to_string()),
        italic(&escape_html(
            "Links are cleaned of tracking parameters before they are used."
        )),
    );

    reply_html(bot, msg, text).await
}

/// Handle the /clean command.
async fn clean_handler(bot: &Bot, msg: &Message, url: &str) -> ResponseResult<()> {
    let url = url.trim();
    if url.is_empty() {
        return reply_html(bot, msg, escape_html(CLEAN_USAGE)).await;
    }

    reply_html(bot, msg, code(&clean_url(url))).await
}

/// Handle the admin-only /journal command.
async fn journal_handler(
    bot: &Bot,
    msg: &Message,
    config: &Config,
    notifier: &Notifier,
) -> Result<()> {
    if !config.is_admin(msg.chat.id) {
        tracing::info!(chat_id = msg.chat.id.0, "Ignoring /journal from non-admin chat");
        return Ok(());
    }

    let entries = notifier.journal().recent(JOURNAL_TAIL).await?;
    reply_html(bot, msg, format_journal(&entries)).await?;
    Ok(())
}

/// Render journal entries for the administrator, newest last.
fn format_journal(entries: &[JournalEntry]) -> String {
    if entries.is_empty() {
        return bold("✅ No errors recorded");
    }

    let mut lines = vec![bold(&escape_html(&format!(
        "🧾 Last {} errors",
        entries.len()
    )))];

    for entry in entries {
        let summary = entry
            .details
            .as_deref()
            .map(|d| d.lines().next().unwrap_or_default())
            .unwrap_or_default();
        let summary = bound_message_to(summary, JOURNAL_SUMMARY_LENGTH);

        lines.push(format!(
            "{} {} {}",
            code(&entry.incident_id),
            escape_html(&entry.kind.to_string()),
            escape_html(&summary)
        ));
    }

    lines.join("\n")
}

/// Reply to a received link, shown as a clickable cleaned URL.
fn format_link_reply(url: &str) -> String {
    format!(
        "{}\n{}",
        bold("🔗 Link received"),
        link(&escape_html(url), &escape_html_attr(url))
    )
}

/// Handle a plain text message: clean the first link in it.
async fn message_handler(bot: &Bot, msg: &Message) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    match find_and_clean_url(text) {
        Some(url) => reply_html(bot, msg, format_link_reply(&url)).await,
        // Stay quiet in groups, where most messages are not meant for the bot.
        None if msg.chat.is_private() => {
            reply_html(bot, msg, escape_html("Send me a link, or /help.")).await
        }
        None => Ok(()),
    }
}

async fn dispatch_command(
    bot: &Bot,
    msg: &Message,
    cmd: &Command,
    config: &Config,
    notifier: &Notifier,
) -> Result<()> {
    match cmd {
        Command::Start => start_handler(bot, msg).await?,
        Command::Help => help_handler(bot, msg).await?,
        Command::Clean(url) => clean_handler(bot, msg, url).await?,
        Command::Journal => journal_handler(bot, msg, config, notifier).await?,
    }
    Ok(())
}

/// Register commands: everyone sees the user commands, the admin chat also
/// sees `/journal`.
async fn register_commands(bot: &Bot, config: &Config) {
    let all = Command::bot_commands();
    let public: Vec<_> = all
        .iter()
        .filter(|c| !c.command.ends_with("journal"))
        .cloned()
        .collect();

    if let Err(e) = bot.set_my_commands(public).await {
        tracing::warn!("Failed to register default commands: {}", e);
    }

    let admin_scope = BotCommandScope::Chat {
        chat_id: Recipient::Id(config.admin_chat_id),
    };
    if let Err(e) = bot.set_my_commands(all).scope(admin_scope).await {
        tracing::warn!("Failed to register admin commands: {}", e);
    }
}

/// Main entry point for the bot.
pub async fn run() -> Result<()> {
    let config = Config::load(None)?;
    let bot = Bot::new(&config.bot_token);

    let notifier = Arc::new(Notifier::new(
        Arc::new(TelegramTransport::from_bot(bot.clone())),
        Arc::new(FileJournal::new(config.journal_path.clone())),
        config.admin_chat_id,
        config.hostname.clone(),
    ));

    tracing::info!(host = %config.hostname, "Starting Telegram download bot...");
    register_commands(&bot, &config).await;

    let command_handler = Update::filter_message()
        .filter_command::<Command>()
        .endpoint({
            let config = config.clone();
            let notifier = notifier.clone();
            move |bot: Bot, msg: Message, cmd: Command| {
                let config = config.clone();
                let notifier = notifier.clone();
                async move {
                    if let Err(e) = dispatch_command(&bot, &msg, &cmd, &config, &notifier).await {
                        let failure = Failure::new(FailureKind::Command, format!("{:#}", e))
                            .with_context(cmd.name())
                            .in_chat(&msg.chat);
                        notifier.handle_failure(failure).await;
                    }
                    respond(())
                }
            }
        });

    let text_handler = Update::filter_message().endpoint({
        let notifier = notifier.clone();
        move |bot: Bot, msg: Message| {
            let notifier = notifier.clone();
            async move {
                if let Err(e) = message_handler(&bot, &msg).await {
                    let failure = Failure::new(FailureKind::Handler, e.to_string())
                        .with_context("text message")
                        .in_chat(&msg.chat);
                    notifier.handle_failure(failure).await;
                }
                respond(())
            }
        }
    });

    let handler = dptree::entry()
        .branch(command_handler)
        .branch(text_handler);

    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::TRUNCATION_NOTICE;

    fn entry(id: &str, details: &str) -> JournalEntry {
        JournalEntry {
            incident_id: id.to_string(),
            timestamp: 0,
            kind: FailureKind::Command,
            context: Some("/clean".to_string()),
            details: Some(details.to_string()),
        }
    }

    #[test]
    fn test_format_journal_empty() {
        assert_eq!(format_journal(&[]), "<b>✅ No errors recorded</b>");
    }

    #[test]
    fn test_format_journal_first_line_only() {
        let text = format_journal(&[entry("ab12cd34", "Bad Request: chat not found\nat line 2")]);

        assert!(text.starts_with("<b>🧾 Last 1 errors</b>\n"));
        assert!(text.contains("<code>ab12cd34</code> command Bad Request: chat not found"));
        assert!(!text.contains("line 2"));
    }

    #[test]
    fn test_format_journal_escapes_details() {
        let text = format_journal(&[entry("ab12cd34", "job <nightly> failed: a&b")]);
        assert!(text.ends_with("command job &lt;nightly&gt; failed: a&amp;b"));
    }

    #[test]
    fn test_format_journal_bounds_summary() {
        let long = "E".repeat(JOURNAL_SUMMARY_LENGTH * 3);
        let text = format_journal(&[entry("ab12cd34", &long)]);

        assert!(text.ends_with(TRUNCATION_NOTICE));
        let kept = JOURNAL_SUMMARY_LENGTH - TRUNCATION_NOTICE.chars().count();
        assert_eq!(text.matches('E').count(), kept);
    }

    #[test]
    fn test_clean_usage_is_html_safe() {
        assert_eq!(escape_html(CLEAN_USAGE), "Usage: /clean &lt;link&gt;");
    }

    #[test]
    fn test_format_link_reply_escapes_href() {
        let text = format_link_reply("https://x.com/a\"onclick=\"x?q=1&r=<2>");
        assert_eq!(
            text,
            "<b>🔗 Link received</b>\n<a href=\"https://x.com/a&quot;onclick=&quot;x?q=1&amp;r=&lt;2&gt;\">https://x.com/a\"onclick=\"x?q=1&amp;r=&lt;2&gt;</a>"
        );
    }

    #[test]
    fn test_command_names() {
        assert_eq!(Command::Clean(String::new()).name(), "/clean");
        assert_eq!(Command::Journal.name(), "/journal");
    }

    #[test]
    fn test_command_parse() {
        let cmd = Command::parse("/clean https://x.com/?utm_source=a", "ytdl_bot").unwrap();
        assert!(matches!(cmd, Command::Clean(url) if url == "https://x.com/?utm_source=a"));
    }
}
