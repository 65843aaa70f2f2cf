//! Mention label resolution.
//!
//! Rewrites the label of every user mention in a `TextRun` from a profile
//! snapshot. Room and everyone mentions keep the label the formatter gave
//! them. A lookup miss, or an empty display name, falls back to the raw
//! identifier so a mention is never shown blank.
//!
//! This is a pure pass with no caching; memoisation belongs to the caller
//! (see [`crate::resolver::RichTextResolver`]).

use crate::profile_directory::ProfileLookup;
use crate::text_run::{MentionKind, TextRun};

/// Resolve all mention labels in `run` against `profiles`.
///
/// Returns `true` if any label changed, so the caller knows dependent
/// visual state must be recomputed.
pub fn resolve<P>(run: &mut TextRun, profiles: &P) -> bool
where
    P: ProfileLookup + ?Sized,
{
    let mut changed = false;

    for marker in run.markers_mut() {
        let candidate = match marker.kind() {
            MentionKind::User => user_label(marker.identifier(), profiles).to_string(),
            MentionKind::Room | MentionKind::Everyone => continue,
        };

        if marker.set_label(&candidate) {
            log::trace!(
                "Mention {} relabelled to {:?}",
                marker.identifier(),
                candidate
            );
            changed = true;
        }
    }

    changed
}

/// Label for a user mention: the directory name, or the identifier on a miss.
fn user_label<'a, P>(identifier: &'a str, profiles: &'a P) -> &'a str
where
    P: ProfileLookup + ?Sized,
{
    match profiles.display_name(identifier) {
        Some(name) if !name.trim().is_empty() => name,
        _ => identifier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile_directory::ProfileSnapshot;
    use crate::text_run::MentionMarker;
    use std::collections::HashMap;

    fn names(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn mixed_run() -> TextRun {
        // "@alice:hs @bob:hs #room:hs @room"
        TextRun::from_parts(
            "@alice:hs @bob:hs #room:hs @room",
            vec![
                MentionMarker::user("@alice:hs", 0..9),
                MentionMarker::user("@bob:hs", 10..17),
                MentionMarker::new(MentionKind::Room, "#room:hs", "#room:hs", 18..26),
                MentionMarker::new(MentionKind::Everyone, "@room", "Everyone", 27..32),
            ],
        )
    }

    #[test]
    fn test_user_found_and_missing() {
        let mut run = mixed_run();
        let profiles = names(&[("@alice:hs", "Alice")]);

        assert!(resolve(&mut run, &profiles));

        let labels: Vec<&str> = run.markers().iter().map(|m| m.label()).collect();
        assert_eq!(labels, vec!["Alice", "@bob:hs", "#room:hs", "Everyone"]);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut run = mixed_run();
        let snapshot = ProfileSnapshot::new(4, names(&[("@bob:hs", "Bob")]));

        assert!(resolve(&mut run, &snapshot));
        assert!(!resolve(&mut run, &snapshot));
    }

    #[test]
    fn test_miss_after_hit_reverts_to_identifier() {
        let mut run = mixed_run();
        resolve(&mut run, &names(&[("@alice:hs", "Alice")]));
        assert_eq!(run.markers()[0].label(), "Alice");

        assert!(resolve(&mut run, &names(&[])));
        assert_eq!(run.markers()[0].label(), "@alice:hs");
    }

    #[test]
    fn test_blank_display_name_falls_back() {
        let mut run = mixed_run();
        resolve(&mut run, &names(&[("@alice:hs", "   ")]));
        assert_eq!(run.markers()[0].label(), "@alice:hs");
    }

    #[test]
    fn test_room_and_everyone_never_touched() {
        let mut run = mixed_run();
        // Even if the directory happens to contain the room ids
        let profiles = names(&[("#room:hs", "Lobby"), ("@room", "All")]);
        resolve(&mut run, &profiles);

        assert_eq!(run.markers()[2].label(), "#room:hs");
        assert_eq!(run.markers()[3].label(), "Everyone");
    }

    #[test]
    fn test_malformed_identifier_is_a_miss() {
        let mut run = TextRun::from_parts(
            "@@@ hi",
            vec![MentionMarker::new(MentionKind::User, "@@@", "", 0..3)],
        );
        assert!(resolve(&mut run, &names(&[])));
        assert_eq!(run.markers()[0].label(), "@@@");
        assert_eq!(run.display_text(), "@@@ hi");
    }
}
