//! Styled spans in Telegram's HTML dialect.
//!
//! `bold`, `italic`, `underline`, `strikethrough` and `quote` wrap their
//! input verbatim; escape it first with [`escape_html`] when it is raw user
//! text. `code` and `pre` escape their input themselves, so callers must pass
//! raw text to them. `link` and `mention` do not touch the URL; escape it
//! with [`escape_html_attr`](super::escape_html_attr).

use super::escape::{escape_code, escape_html, escape_html_attr};

pub fn bold(text: &str) -> String {
    format!("<b>{}</b>", text)
}

pub fn italic(text: &str) -> String {
    format!("<i>{}</i>", text)
}

pub fn underline(text: &str) -> String {
    format!("<u>{}</u>", text)
}

pub fn strikethrough(text: &str) -> String {
    format!("<s>{}</s>", text)
}

pub fn quote(text: &str) -> String {
    format!("<blockquote>{}</blockquote>", text)
}

/// Inline monospace. `text` must be raw.
pub fn code(text: &str) -> String {
    format!("<code>{}</code>", escape_code(text))
}

/// Monospace block. `text` must be raw.
pub fn pre(text: &str) -> String {
    format!("<pre>{}</pre>", escape_code(text))
}

/// Anchor pointing at `url`. The URL is used as given.
pub fn link(text: &str, url: &str) -> String {
    format!("<a href=\"{}\">{}</a>", url, text)
}

/// Anchor opening the profile of the user with the given id.
pub fn mention(text: &str, user_id: u64) -> String {
    link(text, &format!("tg://user?id={}", user_id))
}

/// A piece of text together with the role it is rendered in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Plain(String),
    Bold(String),
    Italic(String),
    CodeInline(String),
    CodeBlock(String),
    Link { text: String, url: String },
    Quote(String),
    Mention { text: String, user_id: u64 },
}

impl Fragment {
    /// Render the fragment. Text and URLs are treated as raw and escaped for
    /// their context.
    pub fn render(&self) -> String {
        match self {
            Fragment::Plain(text) => escape_html(text),
            Fragment::Bold(text) => bold(&escape_html(text)),
            Fragment::Italic(text) => italic(&escape_html(text)),
            Fragment::CodeInline(text) => code(text),
            Fragment::CodeBlock(text) => pre(text),
            Fragment::Link { text, url } => link(&escape_html(text), &escape_html_attr(url)),
            Fragment::Quote(text) => quote(&escape_html(text)),
            Fragment::Mention { text, user_id } => mention(&escape_html(text), *user_id),
        }
    }

    /// Render a sequence of fragments back to back.
    pub fn render_all(fragments: &[Fragment]) -> String {
        fragments.iter().map(Fragment::render).collect()
    }
}
