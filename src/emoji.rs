//! Emoji-only body classification.
//!
//! A body is emoji-only when, ignoring whitespace, every extended grapheme
//! cluster is an emoji. The renderer uses this to pick a larger display
//! style; the text itself is never altered.

use regex::Regex;
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

/// Static regex matching exactly one emoji grapheme.
static EMOJI_GRAPHEME_REGEX: OnceLock<Regex> = OnceLock::new();

// A single emoji element: something drawn as emoji by default, a text-default
// emoji forced with VS16, or a modifier base with its skin tone. Skin tones
// and regional indicators never stand alone.
const EMOJI_ELEMENT: &str = concat!(
    r"(?:",
    r"\x{1F3F4}[\x{E0020}-\x{E007E}]+\x{E007F}",
    r"|[\p{Emoji_Modifier_Base}]\p{Emoji_Modifier}\x{FE0F}?",
    r"|[\p{Emoji_Presentation}--[\p{Emoji_Modifier}\p{Regional_Indicator}]]\x{FE0F}?\p{Emoji_Modifier}?",
    r"|[\p{Emoji}--[\p{Emoji_Modifier}\p{Regional_Indicator}\p{ASCII}]]\x{FE0F}",
    r")",
);

/// Get the compiled emoji grapheme regex (compiled once on first use).
fn emoji_grapheme_regex() -> &'static Regex {
    EMOJI_GRAPHEME_REGEX.get_or_init(|| {
        let pattern = format!(
            r"^(?:\p{{Regional_Indicator}}{{2}}|[0-9#*]\x{{FE0F}}?\x{{20E3}}|{element}(?:\x{{200D}}{element})*)$",
            element = EMOJI_ELEMENT
        );
        Regex::new(&pattern).expect("Failed to compile emoji grapheme regex")
    })
}

/// True when `text` holds at least one emoji and nothing but emoji and whitespace.
pub fn is_emoji_only(text: &str) -> bool {
    let mut saw_emoji = false;
    for grapheme in text.graphemes(true) {
        if grapheme.chars().all(char::is_whitespace) {
            continue;
        }
        if !is_emoji_grapheme(grapheme) {
            return false;
        }
        saw_emoji = true;
    }
    saw_emoji
}

/// True when a single grapheme cluster renders as an emoji.
///
/// Accepts regional-indicator flag pairs, keycaps, subdivision flags, and
/// ZWJ sequences of emoji elements. Text symbols (✓ ☆), ASCII forced with
/// VS16 (`!\u{FE0F}`), and lone selectors or skin tones are rejected.
pub fn is_emoji_grapheme(grapheme: &str) -> bool {
    !grapheme.is_empty() && emoji_grapheme_regex().is_match(grapheme)
}
