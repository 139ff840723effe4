//! Formatting utilities (Minecraft colour codes, Telegram HTML).

use std::sync::OnceLock;

use regex::Regex;

/// Which `§` formatting codes to remove from console output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorFilter {
    /// Every `§x` marker.
    #[default]
    All,
    /// Only `§6` (gold), leaving other codes intact.
    GoldOnly,
}

impl ColorFilter {
    fn regex(self) -> &'static Regex {
        static ALL: OnceLock<Regex> = OnceLock::new();
        static GOLD: OnceLock<Regex> = OnceLock::new();

        match self {
            // `(?s)` so a marker followed by a newline is still a complete marker.
            ColorFilter::All => ALL.get_or_init(|| Regex::new(r"(?s)§.").expect("valid regex")),
            ColorFilter::GoldOnly => GOLD.get_or_init(|| Regex::new("§6").expect("valid regex")),
        }
    }
}

/// Remove complete two-character `§` markers selected by `filter`.
///
/// A trailing `§` with nothing after it is not a marker and is kept.
pub fn strip_color_codes(text: &str, filter: ColorFilter) -> String {
    filter.regex().replace_all(text, "").into_owned()
}

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Escape `text` for Telegram HTML, keeping at most `max_len` escaped characters.
///
/// An entity is never split; a cut output ends with `...`.
pub fn escape_html_truncated(text: &str, max_len: usize) -> String {
    let mut out = String::new();
    let mut len = 0usize;
    let mut buf = [0u8; 4];

    for c in text.chars() {
        let piece: &str = match c {
            '&' => "&amp;",
            '<' => "&lt;",
            '>' => "&gt;",
            '"' => "&quot;",
            _ => c.encode_utf8(&mut buf),
        };
        let n = piece.chars().count();
        if len + n > max_len {
            out.push_str("...");
            return out;
        }
        out.push_str(piece);
        len += n;
    }
    out
}
