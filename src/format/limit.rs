//! Length bounding for message bodies.
//!
//! Bound the variable part of a message (a stack trace, tool output) before
//! wrapping it in tags. Cutting an already wrapped string can split a tag
//! and Telegram rejects the whole message.

/// Hard ceiling Telegram enforces on a text message, in characters.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// Working limit for a bounded body. The remainder of the ceiling is
/// headroom for the tags and headers wrapped around the body.
pub const MAX_BODY_LENGTH: usize = 4000;

/// Appended to a body that had to be cut.
pub const TRUNCATION_NOTICE: &str =
    "\n\n… message truncated, the full text is in the error journal";

// Byte length bounds the char count from above.
const _: () = assert!(TRUNCATION_NOTICE.len() < MAX_BODY_LENGTH);
const _: () = assert!(MAX_BODY_LENGTH <= TELEGRAM_MESSAGE_LIMIT);

/// Bound `text` to [`MAX_BODY_LENGTH`] characters.
///
/// Text that fits is returned unchanged. Longer text is cut so that the cut
/// prefix plus [`TRUNCATION_NOTICE`] is exactly `MAX_BODY_LENGTH` characters.
pub fn bound_message(text: &str) -> String {
    bound_message_to(text, MAX_BODY_LENGTH)
}

/// Bound `text` to `limit` characters.
///
/// When `limit` is too small to hold the notice, the text is cut to `limit`
/// characters without one.
pub fn bound_message_to(text: &str, limit: usize) -> String {
    let notice_len = TRUNCATION_NOTICE.chars().count();

    let Some(budget) = limit.checked_sub(notice_len).filter(|b| *b > 0) else {
        return text.chars().take(limit).collect();
    };

    if text.chars().count() <= budget {
        return text.to_string();
    }

    let mut result: String = text.chars().take(budget).collect();
    result.push_str(TRUNCATION_NOTICE);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget() -> usize {
        MAX_BODY_LENGTH - TRUNCATION_NOTICE.chars().count()
    }

    #[test]
    fn test_short_text_unchanged() {
        assert_eq!(bound_message("boom"), "boom");
        assert_eq!(bound_message(""), "");
    }

    #[test]
    fn test_text_at_budget_unchanged() {
        let text = "x".repeat(budget());
        assert_eq!(bound_message(&text), text);
    }

    #[test]
    fn test_text_over_budget_truncated() {
        let text = "y".repeat(budget() + 1);
        let bounded = bound_message(&text);

        assert_eq!(bounded.chars().count(), MAX_BODY_LENGTH);
        assert!(bounded.ends_with(TRUNCATION_NOTICE));
        assert!(bounded.starts_with(&"y".repeat(budget())));
    }

    #[test]
    fn test_truncation_counts_chars_not_bytes() {
        let text = "🎬".repeat(MAX_BODY_LENGTH);
        let bounded = bound_message(&text);

        assert_eq!(bounded.chars().count(), MAX_BODY_LENGTH);
        assert!(bounded.starts_with("🎬"));
        assert!(bounded.ends_with(TRUNCATION_NOTICE));
    }

    #[test]
    fn test_custom_limit() {
        let notice_len = TRUNCATION_NOTICE.chars().count();
        let bounded = bound_message_to(&"z".repeat(500), notice_len + 10);
        assert_eq!(bounded, format!("{}{}", "z".repeat(10), TRUNCATION_NOTICE));
    }

    #[test]
    fn test_limit_too_small_for_notice() {
        assert_eq!(bound_message_to("abcdef", 3), "abc");
        assert_eq!(bound_message_to("ab", 3), "ab");
    }
}
