// Library exports for rich message bodies
//
// Data flows one way:
//
//   formatter -> RawBody -> RichTextResolver::render -> ResolvedText -> renderer
//                                  |
//                       ProfileDirectory snapshot
//
// Mention resolution and link scanning are pure; the resolver owns the only
// mutable state (its memo cache), guarded by a `parking_lot::Mutex`. Profile
// snapshots are published through `arc_swap` so readers never lock.

/// Crate version, for embedding applications that report it.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod emoji;
pub mod link_detection;
pub mod mention;
pub mod profile_directory;
pub mod resolver;
pub mod text_run;

pub use rich_body_config as config;

pub use link_detection::{LinkCandidate, LinkScan, LinkScanner};
pub use profile_directory::{
    ProfileDirectory, ProfileLookup, ProfileSnapshot, SharedProfileDirectory, SubscriptionId,
};
pub use resolver::{CacheStats, RawBody, ResolvedText, RichTextResolver};
pub use text_run::{MentionKind, MentionMarker, TextRun};
