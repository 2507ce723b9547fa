//! Text helpers for chat replies.
//!
//! [`escape_markdown_v2`] makes dynamic text safe to embed in a Telegram
//! MarkdownV2 message. The masking helpers hide personal data in summaries;
//! they only produce display strings and never touch the stored value.

use std::sync::OnceLock;

use regex::Regex;

/// Characters Telegram reserves in MarkdownV2, plus the backslash itself.
const RESERVED_PATTERN: &str = r"[_*\[\]()~`>#+\-=|{}.!\\]";

static RESERVED: OnceLock<Regex> = OnceLock::new();

fn reserved() -> &'static Regex {
    RESERVED.get_or_init(|| Regex::new(RESERVED_PATTERN).unwrap())
}

/// Escapes every MarkdownV2 reserved character with a backslash.
pub fn escape_markdown_v2(text: &str) -> String {
    reserved().replace_all(text, r"\$0").into_owned()
}

/// Masks the local part of an email address.
///
/// `"abc@x.com"` becomes `"ab***@x.com"`; a local part shorter than two
/// characters is hidden entirely.
pub fn mask_email(email: &str) -> String {
    if email.is_empty() {
        return String::new();
    }
    let (local, domain) = email.split_once('@').unwrap_or((email, ""));
    if local.chars().count() < 2 {
        return format!("***@{}", domain);
    }
    let head: String = local.chars().take(2).collect();
    format!("{}***@{}", head, domain)
}

/// Keeps `keep_start` leading and `keep_end` trailing characters and
/// replaces the rest with asterisks.
///
/// Strings no longer than `keep_start + keep_end` come back unchanged.
pub fn mask_string(s: &str, keep_start: usize, keep_end: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len();
    let start = keep_start.min(len);
    let end = keep_end.min(len - start);
    let hidden = len - start - end;

    let mut out = String::with_capacity(s.len() + hidden);
    out.extend(&chars[..start]);
    out.extend(std::iter::repeat('*').take(hidden));
    out.extend(&chars[len - end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_reserved_characters() {
        let input = "_*[]()~`>#+-=|{}.!";
        let escaped = escape_markdown_v2(input);
        assert_eq!(escaped, r"\_\*\[\]\(\)\~\`\>\#\+\-\=\|\{\}\.\!");
    }

    #[test]
    fn test_escape_leaves_plain_text() {
        assert_eq!(escape_markdown_v2("Bitcoin BTC 42"), "Bitcoin BTC 42");
        assert_eq!(escape_markdown_v2(""), "");
    }

    #[test]
    fn test_escape_numbers_and_backslash() {
        assert_eq!(escape_markdown_v2("1,234.5"), r"1,234\.5");
        assert_eq!(escape_markdown_v2("-2.75"), r"\-2\.75");
        assert_eq!(escape_markdown_v2(r"a\b"), r"a\\b");
    }

    #[test]
    fn test_escape_unicode() {
        assert_eq!(escape_markdown_v2("تهران (Tehran)"), r"تهران \(Tehran\)");
    }

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("ab@example.com"), "ab***@example.com");
        assert_eq!(mask_email("a@example.com"), "***@example.com");
        assert_eq!(mask_email("john.doe@x.com"), "jo***@x.com");
        assert_eq!(mask_email(""), "");
    }

    #[test]
    fn test_mask_email_without_domain() {
        assert_eq!(mask_email("johndoe"), "jo***@");
    }

    #[test]
    fn test_mask_string() {
        assert_eq!(mask_string("password", 1, 1), "p******d");
        assert_eq!(mask_string("Jo", 2, 0), "Jo");
        assert_eq!(mask_string("John Doe", 2, 0), "Jo******");
        assert_eq!(mask_string("", 2, 0), "");
    }

    #[test]
    fn test_mask_string_short_inputs() {
        assert_eq!(mask_string("ab", 1, 1), "ab");
        assert_eq!(mask_string("a", 1, 1), "a");
        assert_eq!(mask_string("abc", 1, 1), "a*c");
    }

    #[test]
    fn test_mask_string_counts_characters() {
        assert_eq!(mask_string("Zoë Åberg", 2, 0), "Zo*******");
    }
}
