//! Composition root for rich message bodies.
//!
//! `RichTextResolver` turns a formatter-supplied [`RawBody`] into a
//! [`ResolvedText`] for the renderer: mention labels resolved against a
//! profile snapshot, plus the emoji-only display flag. Resolution is memoised
//! per `(body identity, snapshot version)`; link scanning is exposed as a
//! stateless utility and never cached.

mod cache;

pub use cache::{CacheStats, ResolutionCache};

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::Mutex;
use rich_body_config::RichBodyConfig;

use crate::emoji;
use crate::link_detection::{LinkCandidate, LinkScan, LinkScanner};
use crate::mention;
use crate::profile_directory::{ProfileDirectory, ProfileSnapshot};
use crate::text_run::{MentionMarker, TextRun};

/// A message body as handed over by the formatter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawBody {
    /// Plain-text rendering; mention marker ranges index into this.
    pub plain: String,
    /// Alternate formatted representation (e.g. HTML), if the message has one.
    pub formatted: Option<String>,
    /// The formatter flagged this body as plain text only.
    pub is_plain_text: bool,
    /// Pre-parsed mention markers.
    pub markers: Vec<MentionMarker>,
}

impl RawBody {
    /// A plain-text body with no mentions.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            plain: text.into(),
            formatted: None,
            is_plain_text: true,
            markers: Vec::new(),
        }
    }

    pub fn with_formatted(mut self, formatted: impl Into<String>) -> Self {
        self.formatted = Some(formatted.into());
        self.is_plain_text = false;
        self
    }

    pub fn with_markers(mut self, markers: Vec<MentionMarker>) -> Self {
        self.markers = markers;
        self
    }

    /// Stable content hash used as the memo key.
    ///
    /// The cache confirms the plain text on every hit, so a collision costs
    /// a re-resolve, never another body's labels.
    pub fn identity(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// True when a formatted representation exists that differs from the
    /// plain text.
    fn has_distinct_formatting(&self) -> bool {
        if self.is_plain_text {
            return false;
        }
        self.formatted
            .as_deref()
            .is_some_and(|formatted| formatted != self.plain)
    }
}

/// The renderer-facing result of one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedText {
    /// The run with up-to-date mention labels.
    pub run: TextRun,
    /// Snapshot version the labels were resolved against.
    pub version: u64,
    /// Some label differs from the previous resolution of this body.
    pub changed: bool,
    /// Render with the large emoji style.
    pub emoji_only: bool,
}

impl ResolvedText {
    pub fn display_text(&self) -> String {
        self.run.display_text()
    }
}

/// Resolves message bodies and memoises the result.
///
/// All methods take `&self`; the cache sits behind a mutex, so one resolver
/// can be shared between views.
#[derive(Debug)]
pub struct RichTextResolver {
    config: RichBodyConfig,
    scanner: LinkScanner,
    cache: Mutex<ResolutionCache>,
}

impl Default for RichTextResolver {
    fn default() -> Self {
        Self::new(&RichBodyConfig::default())
    }
}

impl RichTextResolver {
    pub fn new(config: &RichBodyConfig) -> Self {
        Self {
            config: config.clone(),
            scanner: LinkScanner::new(&config.links),
            cache: Mutex::new(ResolutionCache::new(config.cache.max_entries)),
        }
    }

    pub fn config(&self) -> &RichBodyConfig {
        &self.config
    }

    /// Resolve `raw` against `snapshot`.
    ///
    /// Returns the cached `Arc` unchanged when this body was already resolved
    /// at this snapshot version.
    pub fn render(&self, raw: &RawBody, snapshot: &ProfileSnapshot) -> Arc<ResolvedText> {
        let identity = raw.identity();
        let version = snapshot.version();

        let mut cache = self.cache.lock();
        if let Some(hit) = cache.get(identity, version, &raw.plain) {
            return hit;
        }

        log::debug!(
            "Resolving body {:016x} at profile version {}",
            identity,
            version
        );

        // Start from the last resolution of this body so `changed` reflects
        // labels that actually moved.
        let (mut run, emoji_only) = match cache.previous(identity, &raw.plain) {
            Some(previous) => (previous.run.clone(), previous.emoji_only),
            None => (
                TextRun::from_parts(raw.plain.clone(), raw.markers.clone()),
                self.classify_emoji_only(raw),
            ),
        };
        let changed = mention::resolve(&mut run, snapshot);

        let resolved = Arc::new(ResolvedText {
            run,
            version,
            changed,
            emoji_only,
        });
        cache.put(identity, Arc::clone(&resolved));
        resolved
    }

    /// Resolve `raw` against the directory's latest snapshot.
    pub fn render_latest<D>(&self, raw: &RawBody, directory: &D) -> Arc<ResolvedText>
    where
        D: ProfileDirectory + ?Sized,
    {
        self.render(raw, &directory.snapshot())
    }

    fn classify_emoji_only(&self, raw: &RawBody) -> bool {
        self.config.emoji.detect_emoji_only
            && !raw.has_distinct_formatting()
            && emoji::is_emoji_only(&raw.plain)
    }

    /// The configured link scanner.
    pub fn link_scanner(&self) -> &LinkScanner {
        &self.scanner
    }

    /// Scan one plain-text segment for links.
    pub fn scan_links<'t>(&self, segment: &'t str) -> LinkScan<'_, 't> {
        self.scanner.scan(segment)
    }

    /// Links in the plain segments of `run`, with offsets into `run.text()`.
    ///
    /// Mention ranges are never scanned, and a link cannot cross a mention.
    pub fn scan_run(&self, run: &TextRun) -> Vec<LinkCandidate> {
        run.plain_segments()
            .flat_map(|(offset, segment)| {
                self.scanner.scan(segment).map(move |mut link| {
                    link.start += offset;
                    link.end += offset;
                    link
                })
            })
            .collect()
    }

    /// Forget every cached resolution of one body.
    pub fn invalidate(&self, identity: u64) -> bool {
        self.cache.lock().invalidate(identity)
    }

    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.lock().stats()
    }
}

#[cfg(test)]
mod tests;
