//! Shared integration test helpers for rich-body.
//!
//! Include with `mod common;` at the top of a test file. The
//! `#[allow(dead_code)]` below suppresses warnings when a file only uses a
//! subset of the helpers.

#![allow(dead_code)]

use rich_body::config::RichBodyConfig;
use rich_body::{MentionMarker, RawBody, SharedProfileDirectory};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A directory pre-populated with a small cast of users.
///
/// Published as a single batch, so the directory is at version 1.
pub fn seeded_directory() -> SharedProfileDirectory {
    let directory = SharedProfileDirectory::new();
    directory.apply_updates([
        ("@alice:example.org".to_string(), Some("Alice".to_string())),
        ("@bob:example.org".to_string(), Some("Bob".to_string())),
    ]);
    directory
}

/// A plain-text body mentioning each identifier in turn, separated by spaces.
///
/// Marker ranges are computed from the text, so callers never hand-count
/// byte offsets.
pub fn body_mentioning(prefix: &str, identifiers: &[&str]) -> RawBody {
    let mut text = prefix.to_string();
    let mut markers = Vec::with_capacity(identifiers.len());
    for id in identifiers {
        if !text.is_empty() {
            text.push(' ');
        }
        let start = text.len();
        text.push_str(id);
        markers.push(MentionMarker::user(*id, start..text.len()));
    }
    RawBody::plain(text).with_markers(markers)
}

/// Writes `yaml` to a config file inside a fresh temp dir.
///
/// The `TempDir` must be kept alive for as long as the path is used.
pub fn config_file_with(yaml: &str) -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("config.yaml");
    fs::write(&path, yaml).expect("Failed to write config");
    (path, temp_dir)
}

/// Loads a config from YAML text via a temp file.
pub fn config_from_yaml(yaml: &str) -> RichBodyConfig {
    let (path, _temp_dir) = config_file_with(yaml);
    RichBodyConfig::load_from(&path).expect("Failed to load config")
}
