//! Text runs and the mention markers embedded in them.
//!
//! A `TextRun` is produced by the external formatter from a message body. It
//! owns the source text and a sorted list of `MentionMarker`s whose ranges
//! index that text. Resolution only ever rewrites marker labels; ranges and
//! the source text are fixed for the lifetime of the run.

use std::ops::Range;

/// What a mention marker points at.
///
/// Adding a kind forces every `match` on it to be revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MentionKind {
    /// A user, identified by an opaque user id.
    User,
    /// A room reference. Passed through unresolved.
    Room,
    /// The "everyone" pseudo-mention (`@room`). Passed through unresolved.
    Everyone,
}

/// A labelled mention range within a `TextRun`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MentionMarker {
    kind: MentionKind,
    identifier: String,
    current_label: String,
    range: Range<usize>,
}

impl MentionMarker {
    /// Create a marker with the label supplied by the formatter.
    pub fn new(
        kind: MentionKind,
        identifier: impl Into<String>,
        label: impl Into<String>,
        range: Range<usize>,
    ) -> Self {
        Self {
            kind,
            identifier: identifier.into(),
            current_label: label.into(),
            range,
        }
    }

    /// Shorthand for a user mention whose initial label is its identifier.
    pub fn user(identifier: impl Into<String>, range: Range<usize>) -> Self {
        let identifier = identifier.into();
        let label = identifier.clone();
        Self::new(MentionKind::User, identifier, label, range)
    }

    pub fn kind(&self) -> MentionKind {
        self.kind
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn label(&self) -> &str {
        &self.current_label
    }

    /// Byte range of the marker in the owning run's source text.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Replace the label if it differs. Returns `true` when it changed.
    pub fn set_label(&mut self, label: &str) -> bool {
        if self.current_label == label {
            return false;
        }
        self.current_label.clear();
        self.current_label.push_str(label);
        true
    }
}

/// Source text plus its mention markers, sorted by start offset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TextRun {
    text: String,
    markers: Vec<MentionMarker>,
}

impl TextRun {
    /// A run with no mentions.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markers: Vec::new(),
        }
    }

    /// Build a run from formatter output.
    ///
    /// Markers that are empty, out of bounds, not on a char boundary, or
    /// overlapping an earlier marker are logged and skipped.
    pub fn from_parts(text: impl Into<String>, markers: Vec<MentionMarker>) -> Self {
        let text = text.into();
        let mut markers = markers;
        markers.sort_by_key(|m| (m.range.start, m.range.end));

        let mut accepted: Vec<MentionMarker> = Vec::with_capacity(markers.len());
        for marker in markers {
            let range = marker.range();
            let in_bounds = range.start < range.end
                && range.end <= text.len()
                && text.is_char_boundary(range.start)
                && text.is_char_boundary(range.end);
            if !in_bounds {
                log::warn!(
                    "Skipping mention marker '{}' with invalid range {:?} (text length {})",
                    marker.identifier,
                    range,
                    text.len()
                );
                continue;
            }
            if let Some(prev) = accepted.last()
                && prev.range.end > range.start
            {
                log::warn!(
                    "Skipping mention marker '{}' at {:?}: overlaps '{}' at {:?}",
                    marker.identifier,
                    range,
                    prev.identifier,
                    prev.range
                );
                continue;
            }
            accepted.push(marker);
        }

        Self {
            text,
            markers: accepted,
        }
    }

    /// The source text the marker ranges index into.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn markers(&self) -> &[MentionMarker] {
        &self.markers
    }

    /// Mutable access for a resolution pass. Ranges stay private, so only
    /// labels can be changed through this.
    pub fn markers_mut(&mut self) -> &mut [MentionMarker] {
        &mut self.markers
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The text as displayed: every marker range replaced by its label.
    pub fn display_text(&self) -> String {
        let mut out = String::with_capacity(self.text.len());
        let mut cursor = 0;
        for marker in &self.markers {
            out.push_str(&self.text[cursor..marker.range.start]);
            out.push_str(&marker.current_label);
            cursor = marker.range.end;
        }
        out.push_str(&self.text[cursor..]);
        out
    }

    /// Non-empty stretches of source text between markers, with their
    /// starting byte offset. These are the only parts eligible for linkifying.
    pub fn plain_segments(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        let mut bounds = Vec::with_capacity(self.markers.len() + 1);
        let mut cursor = 0;
        for marker in &self.markers {
            bounds.push(cursor..marker.range.start);
            cursor = marker.range.end;
        }
        bounds.push(cursor..self.text.len());

        bounds
            .into_iter()
            .filter(|r| !r.is_empty())
            .map(move |r| (r.start, &self.text[r]))
    }
}
