//! Telegram MarkdownV2 helpers

/// Characters that must be backslash-escaped in MarkdownV2 text
const SPECIAL: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
    '\\',
];

/// Escape `text` so Telegram renders it literally in a MarkdownV2 message
pub fn escape_markdown_v2(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    for ch in text.chars() {
        if SPECIAL.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Bold `text`, escaping its content
pub fn bold(text: &str) -> String {
    format!("*{}*", escape_markdown_v2(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_every_reserved_character() {
        assert_eq!(
            escape_markdown_v2(r"_*[]()~`>#+-=|{}.!\"),
            r"\_\*\[\]\(\)\~\`\>\#\+\-\=\|\{\}\.\!\\"
        );
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(escape_markdown_v2("Привет world 42"), "Привет world 42");
        assert_eq!(escape_markdown_v2(""), "");
    }

    #[test]
    fn escapes_urls() {
        assert_eq!(
            escape_markdown_v2("https://example.com/a_b?x=1"),
            r"https://example\.com/a\_b?x\=1"
        );
    }

    #[test]
    fn bold_wraps_escaped_text() {
        assert_eq!(bold("v1.0 (beta)"), r"*v1\.0 \(beta\)*");
    }
}
