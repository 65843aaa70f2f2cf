//! Tests for the memoising resolver.

use super::*;
use crate::text_run::MentionKind;
use rich_body_config::EmojiConfig;
use std::collections::HashMap;

fn snapshot(version: u64, pairs: &[(&str, &str)]) -> ProfileSnapshot {
    let names: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ProfileSnapshot::new(version, names)
}

fn greeting() -> RawBody {
    // "hi @alice:hs, see example.com"
    RawBody::plain("hi @alice:hs, see example.com")
        .with_markers(vec![MentionMarker::user("@alice:hs", 3..12)])
}

#[test]
fn test_render_resolves_labels() {
    let resolver = RichTextResolver::default();
    let resolved = resolver.render(&greeting(), &snapshot(1, &[("@alice:hs", "Alice")]));

    assert_eq!(resolved.display_text(), "hi Alice, see example.com");
    assert_eq!(resolved.version, 1);
    assert!(resolved.changed);
    assert!(!resolved.emoji_only);
}

#[test]
fn test_cache_hit_returns_same_arc() {
    let resolver = RichTextResolver::default();
    let body = greeting();
    let snap = snapshot(1, &[("@alice:hs", "Alice")]);

    let first = resolver.render(&body, &snap);
    let second = resolver.render(&body, &snap);

    assert!(Arc::ptr_eq(&first, &second));
    let stats = resolver.stats();
    assert_eq!(stats.hit_count, 1);
    assert_eq!(stats.miss_count, 1);
    assert_eq!(stats.entry_count, 1);
}

#[test]
fn test_rename_reports_change() {
    let resolver = RichTextResolver::default();
    let body = greeting();

    resolver.render(&body, &snapshot(1, &[("@alice:hs", "Alice")]));
    let renamed = resolver.render(&body, &snapshot(2, &[("@alice:hs", "Alicia")]));

    assert!(renamed.changed);
    assert_eq!(renamed.version, 2);
    assert_eq!(renamed.display_text(), "hi Alicia, see example.com");
}

#[test]
fn test_unrelated_bump_reports_no_change() {
    let resolver = RichTextResolver::default();
    let body = greeting();

    let first = resolver.render(&body, &snapshot(1, &[("@alice:hs", "Alice")]));
    let bumped = resolver.render(
        &body,
        &snapshot(2, &[("@alice:hs", "Alice"), ("@bob:hs", "Bob")]),
    );

    assert!(!Arc::ptr_eq(&first, &bumped));
    assert!(!bumped.changed);
    assert_eq!(bumped.version, 2);
}

#[test]
fn test_stale_snapshot_does_not_evict_newer_version() {
    let resolver = RichTextResolver::default();
    let body = greeting();
    let v1 = snapshot(1, &[("@alice:hs", "Alice")]);
    let v2 = snapshot(2, &[("@alice:hs", "Alicia")]);

    let fresh = resolver.render(&body, &v2);
    let stale = resolver.render(&body, &v1);
    let fresh_again = resolver.render(&body, &v2);

    assert_eq!(stale.display_text(), "hi Alice, see example.com");
    assert!(Arc::ptr_eq(&fresh, &fresh_again));
    assert_eq!(fresh_again.display_text(), "hi Alicia, see example.com");

    // Both views keep hitting their own entry
    assert!(Arc::ptr_eq(&stale, &resolver.render(&body, &v1)));
    let stats = resolver.stats();
    assert_eq!(stats.miss_count, 2);
    assert_eq!(stats.hit_count, 2);
    assert_eq!(stats.entry_count, 2);
}

#[test]
fn test_unmentioned_body_never_changes() {
    let resolver = RichTextResolver::default();
    let resolved = resolver.render(&RawBody::plain("hello"), &snapshot(7, &[]));
    assert!(!resolved.changed);
    assert_eq!(resolved.display_text(), "hello");
}

#[test]
fn test_distinct_bodies_are_cached_separately() {
    let resolver = RichTextResolver::default();
    let snap = snapshot(1, &[]);
    let a = RawBody::plain("one");
    let b = RawBody::plain("two");

    assert_ne!(a.identity(), b.identity());
    resolver.render(&a, &snap);
    resolver.render(&b, &snap);
    assert_eq!(resolver.stats().entry_count, 2);
}

#[test]
fn test_identity_covers_markers_and_formatting() {
    let base = RawBody::plain("@a:hs");
    let with_marker = base
        .clone()
        .with_markers(vec![MentionMarker::user("@a:hs", 0..5)]);
    let formatted = base.clone().with_formatted("<b>@a:hs</b>");

    assert_eq!(base.identity(), RawBody::plain("@a:hs").identity());
    assert_ne!(base.identity(), with_marker.identity());
    assert_ne!(base.identity(), formatted.identity());
}

#[test]
fn test_emoji_only_plain_body() {
    let resolver = RichTextResolver::default();
    let snap = snapshot(0, &[]);

    assert!(resolver.render(&RawBody::plain("🎉 🚀"), &snap).emoji_only);
    assert!(!resolver.render(&RawBody::plain("🎉 yay"), &snap).emoji_only);
}

#[test]
fn test_emoji_only_requires_no_distinct_formatting() {
    let resolver = RichTextResolver::default();
    let snap = snapshot(0, &[]);

    let same = RawBody::plain("😀").with_formatted("😀");
    assert!(resolver.render(&same, &snap).emoji_only);

    let styled = RawBody::plain("😀").with_formatted("<big>😀</big>");
    assert!(!resolver.render(&styled, &snap).emoji_only);
}

#[test]
fn test_emoji_detection_can_be_disabled() {
    let config = RichBodyConfig {
        emoji: EmojiConfig {
            detect_emoji_only: false,
        },
        ..RichBodyConfig::default()
    };
    let resolver = RichTextResolver::new(&config);
    assert!(!resolver.render(&RawBody::plain("😀"), &snapshot(0, &[])).emoji_only);
}

#[test]
fn test_scan_run_skips_mentions_and_offsets_into_source() {
    let resolver = RichTextResolver::default();
    // The mention identifier looks like a domain but must not be linkified
    let run = TextRun::from_parts(
        "ping bob.example.org about www.rust-lang.org",
        vec![MentionMarker::new(
            MentionKind::User,
            "@bob:example.org",
            "bob.example.org",
            5..20,
        )],
    );

    let links = resolver.scan_run(&run);
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].url_text, "www.rust-lang.org");
    assert_eq!(&run.text()[links[0].start..links[0].end], "www.rust-lang.org");
}

#[test]
fn test_scan_links_uses_configured_scanner() {
    let mut config = RichBodyConfig::default();
    config.links.bare_domains = false;
    let resolver = RichTextResolver::new(&config);

    assert_eq!(resolver.scan_links("see example.com").count(), 0);
    assert_eq!(resolver.link_scanner().scan("see https://a.io").count(), 1);
}

#[test]
fn test_invalidate_and_clear() {
    let resolver = RichTextResolver::default();
    let body = greeting();
    let snap = snapshot(1, &[]);

    let first = resolver.render(&body, &snap);
    assert!(resolver.invalidate(body.identity()));
    let second = resolver.render(&body, &snap);
    assert!(!Arc::ptr_eq(&first, &second));

    resolver.clear();
    assert_eq!(resolver.stats().entry_count, 0);
}

#[test]
fn test_capacity_from_config() {
    let mut config = RichBodyConfig::default();
    config.cache.max_entries = 2;
    let resolver = RichTextResolver::new(&config);
    let snap = snapshot(0, &[]);

    for text in ["a", "b", "c"] {
        resolver.render(&RawBody::plain(text), &snap);
    }
    let stats = resolver.stats();
    assert_eq!(stats.max_entries, 2);
    assert_eq!(stats.entry_count, 2);
}
