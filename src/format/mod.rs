//! Outbound message formatting for Telegram's HTML parse mode.
//!
//! Text flows through three stages before it is sent:
//! escaping (`escape`), styling (`markup`) and length bounding (`limit`).

pub mod escape;
pub mod limit;
pub mod markup;

pub use escape::{escape_code, escape_html, escape_html_attr, escape_plain};
pub use limit::{
    bound_message, bound_message_to, MAX_BODY_LENGTH, TELEGRAM_MESSAGE_LIMIT, TRUNCATION_NOTICE,
};
pub use markup::{
    bold, code, italic, link, mention, pre, quote, strikethrough, underline, Fragment,
};
