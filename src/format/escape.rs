//! Escaping for the two rendering contexts: rich text and monospace.
//!
//! Messages go out in Telegram's HTML parse mode, where only `<`, `>` and
//! `&` are control characters. Text placed between tags goes through
//! [`escape_html`], attribute values through [`escape_html_attr`].
//! [`escape_plain`] is the backslash convention of the rich-text dialect and
//! is not HTML-safe on its own.

/// Characters that must be backslash-escaped in rich text.
const PLAIN_RESERVED: [char; 19] = [
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '<', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Substitutions applied inside `<code>` and `<pre>` blocks.
const CODE_SUBSTITUTIONS: [(char, &str); 5] = [
    ('`', "\\`"),
    ('\\', "\\\\"),
    ('<', "&lt;"),
    ('>', "&gt;"),
    ('&', "&amp;"),
];

/// Escape raw text for the rich-text context.
///
/// Must be applied exactly once, to raw input: the result of a second pass
/// renders with stray backslashes.
pub fn escape_plain(text: &str) -> String {
    let mut result = String::with_capacity(text.len() * 2);

    for c in text.chars() {
        if PLAIN_RESERVED.contains(&c) {
            result.push('\\');
        }
        result.push(c);
    }

    result
}

/// Escape raw text placed between HTML tags.
pub fn escape_html(text: &str) -> String {
    text.chars()
        .fold(String::with_capacity(text.len()), |mut escaped, c| {
            match c {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                _ => escaped.push(c),
            }
            escaped
        })
}

/// Escape raw text used as a double-quoted HTML attribute value.
pub fn escape_html_attr(text: &str) -> String {
    text.chars()
        .fold(String::with_capacity(text.len()), |mut escaped, c| {
            match c {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&#39;"),
                _ => escaped.push(c),
            }
            escaped
        })
}

/// Escape raw text for the monospace context.
pub fn escape_code(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + text.len() / 2);

    for c in text.chars() {
        match CODE_SUBSTITUTIONS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => result.push_str(to),
            None => result.push(c),
        }
    }

    result
}
