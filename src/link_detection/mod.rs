//! Link detection and boundary trimming for plain-text message segments.

// A regex finds where a link *starts* (scheme, `www.` or bare domain). The
// right edge is then decided by hand, one character at a time:
//
// 1. extend over URL-valid characters, counting parentheses;
// 2. stop before a `)` that has no matching `(` inside the link;
// 3. strip trailing sentence punctuation, never a `)`, plus a closing `'`
//    that has no partner inside the link.
//
// A running parenthesis depth over the text before each link is kept while
// scanning, so the whole segment is visited once per scan.
use regex::Regex;
use rich_body_config::LinkConfig;
use std::sync::OnceLock;

/// Scanner built from the default `LinkConfig`, used by [`scan`].
static DEFAULT_SCANNER: OnceLock<LinkScanner> = OnceLock::new();

/// A detected link with its final boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    /// Start byte offset in the scanned segment
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
    /// The link text, `segment[start..end]`
    pub url_text: String,
    /// True when the link sits inside a parenthetical opened before it
    pub enclosed: bool,
}

impl LinkCandidate {
    /// The URL to open, with `https://` added when the text has no scheme.
    pub fn href(&self) -> String {
        ensure_url_scheme(&self.url_text)
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Compiled link grammar plus the trailing punctuation set.
#[derive(Debug, Clone)]
pub struct LinkScanner {
    start_regex: Regex,
    trailing_punctuation: Vec<char>,
}

impl Default for LinkScanner {
    fn default() -> Self {
        Self::new(&LinkConfig::default())
    }
}

impl LinkScanner {
    /// Build a scanner from config.
    ///
    /// A pattern that fails to compile is logged and replaced by the default
    /// grammar; scanning itself never fails.
    pub fn new(config: &LinkConfig) -> Self {
        let pattern = link_start_pattern(config);
        let start_regex = match Regex::new(&pattern) {
            Ok(regex) => regex,
            Err(e) => {
                log::warn!("Failed to compile link pattern, using defaults: {}", e);
                Regex::new(&link_start_pattern(&LinkConfig::default()))
                    .expect("Default link pattern is valid")
            }
        };

        let trailing_punctuation = config
            .trailing_punctuation
            .chars()
            .filter(|c| !matches!(c, '(' | ')'))
            .collect();

        Self {
            start_regex,
            trailing_punctuation,
        }
    }

    /// Lazily scan `segment` left to right.
    ///
    /// The returned iterator is single-pass; call `scan` again to restart.
    pub fn scan<'s, 't>(&'s self, segment: &'t str) -> LinkScan<'s, 't> {
        LinkScan {
            scanner: self,
            segment,
            cursor: 0,
            depth_pos: 0,
            outer_depth: 0,
        }
    }

    fn is_trailing_punctuation(&self, ch: char) -> bool {
        self.trailing_punctuation.contains(&ch)
    }
}

/// Iterator over the links in one segment. See [`LinkScanner::scan`].
#[derive(Debug)]
pub struct LinkScan<'s, 't> {
    scanner: &'s LinkScanner,
    segment: &'t str,
    /// Offset where the next start search begins
    cursor: usize,
    /// Offset up to which `outer_depth` has been counted
    depth_pos: usize,
    /// Unmatched `(` seen before `depth_pos`
    outer_depth: usize,
}

impl LinkScan<'_, '_> {
    fn advance_depth(&mut self, target: usize) {
        if target <= self.depth_pos {
            return;
        }
        for ch in self.segment[self.depth_pos..target].chars() {
            match ch {
                '(' => self.outer_depth += 1,
                ')' => self.outer_depth = self.outer_depth.saturating_sub(1),
                _ => {}
            }
        }
        self.depth_pos = target;
    }
}

impl Iterator for LinkScan<'_, '_> {
    type Item = LinkCandidate;

    fn next(&mut self) -> Option<LinkCandidate> {
        while self.cursor <= self.segment.len() {
            let m = self
                .scanner
                .start_regex
                .find_at(self.segment, self.cursor)?;
            let start = m.start();
            self.advance_depth(start);

            if !start_allowed(self.segment, start, m.as_str()) {
                self.cursor = m.end();
                continue;
            }

            let end = extend_link(self.segment, m.end());
            let end = self.trim_trailing(start, end);

            // The start token itself must survive trimming
            if end < m.end() {
                self.cursor = m.end();
                continue;
            }

            // `first.last@example.com` starts like a bare domain
            if !m.as_str().contains("://")
                && authority_has_userinfo(&self.segment[start..end])
            {
                self.cursor = end;
                continue;
            }

            self.cursor = end;
            return Some(LinkCandidate {
                start,
                end,
                url_text: self.segment[start..end].to_string(),
                enclosed: self.outer_depth > 0,
            });
        }
        None
    }
}

impl LinkScan<'_, '_> {
    fn trim_trailing(&self, start: usize, mut end: usize) -> usize {
        while end > start {
            let Some(ch) = self.segment[..end].chars().next_back() else {
                break;
            };
            let strip = self.scanner.is_trailing_punctuation(ch)
                || (ch == '\'' && self.segment[start..end].matches('\'').count() % 2 == 1);
            if !strip {
                break;
            }
            end -= ch.len_utf8();
        }
        end
    }
}

/// Build the link-start regex.
///
/// Matches only the start of a link: a scheme plus `://` plus one character,
/// `www.` plus one character, or a complete bare domain.
fn link_start_pattern(config: &LinkConfig) -> String {
    let mut alternatives = Vec::new();

    let schemes: Vec<String> = config
        .schemes
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| regex::escape(s))
        .collect();
    if !schemes.is_empty() {
        alternatives.push(format!(
            r#"(?:{})://[^\s<>"{{}}|\\^`\[\]()]"#,
            schemes.join("|")
        ));
    }

    alternatives.push(r"www\.[\p{L}\p{N}_-]".to_string());

    if config.bare_domains {
        // Lowercase TLD keeps "Mr.Smith" and friends out
        alternatives.push(
            r"(?-i:[\p{L}\p{N}][\p{L}\p{N}_-]*(?:\.[\p{L}\p{N}_-]+)*\.[a-z]{2,63})\b".to_string(),
        );
    }

    format!(r"(?i)\b(?:{})", alternatives.join("|"))
}

/// Reject scheme-less starts glued to an e-mail address or a longer token.
fn start_allowed(segment: &str, start: usize, token: &str) -> bool {
    if token.contains("://") {
        return true;
    }
    match segment[..start].chars().next_back() {
        Some(prev) => !matches!(prev, '@' | '.' | '/' | '-' | '_'),
        None => true,
    }
}

/// True when the host part of a scheme-less link carries an `@`, i.e. the
/// text is an e-mail address rather than a web link.
fn authority_has_userinfo(link: &str) -> bool {
    let authority_end = link.find(['/', '?', '#']).unwrap_or(link.len());
    link[..authority_end].contains('@')
}

/// Characters that may appear inside a link. Parentheses are included and
/// balanced separately.
fn is_url_char(ch: char) -> bool {
    !ch.is_whitespace()
        && !ch.is_control()
        && !matches!(
            ch,
            '<' | '>' | '"' | '{' | '}' | '|' | '\\' | '^' | '`' | '[' | ']'
        )
}

/// Extend a link from `from` over URL characters. Stops before a `)` that
/// would close more parentheses than the link opened.
fn extend_link(segment: &str, from: usize) -> usize {
    let mut depth: usize = 0;
    let mut end = from;

    for (i, ch) in segment[from..].char_indices() {
        if !is_url_char(ch) {
            break;
        }
        match ch {
            '(' => depth += 1,
            ')' => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            _ => {}
        }
        end = from + i + ch.len_utf8();
    }

    end
}

/// Scan `segment` with the default link grammar.
pub fn scan(segment: &str) -> LinkScan<'static, '_> {
    DEFAULT_SCANNER.get_or_init(LinkScanner::default).scan(segment)
}

/// Find the link covering byte `offset`, if any.
pub fn find_link_at(links: &[LinkCandidate], offset: usize) -> Option<&LinkCandidate> {
    links
        .iter()
        .find(|link| offset >= link.start && offset < link.end)
}

/// Ensure a URL has a scheme prefix, adding `https://` if missing.
///
/// # Examples
/// - `"www.example.com"` -> `"https://www.example.com"`
/// - `"https://example.com"` -> `"https://example.com"` (unchanged)
pub fn ensure_url_scheme(url: &str) -> String {
    if !url.contains("://") {
        format!("https://{}", url)
    } else {
        url.to_string()
    }
}
