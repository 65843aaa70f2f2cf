//! Default value functions for configuration.
//!
//! Each function is used as a `#[serde(default = "crate::defaults::...")]`
//! attribute on a config field, and by the matching `Default` impl.

// ── Primitive helpers ──────────────────────────────────────────────────────

pub fn bool_true() -> bool {
    true
}

// ── Link detection ─────────────────────────────────────────────────────────

pub fn link_schemes() -> Vec<String> {
    ["https", "http", "ftps", "ftp", "file", "git", "ssh"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Sentence punctuation stripped from the end of a detected link, ASCII
/// followed by the CJK full-width forms.
pub fn trailing_punctuation() -> String {
    ".,;:!?\u{3002}\u{3001}\u{FF0C}\u{FF1B}\u{FF1A}\u{FF01}\u{FF1F}".to_string()
}

// ── Resolution cache ───────────────────────────────────────────────────────

pub fn cache_max_entries() -> usize {
    256
}
