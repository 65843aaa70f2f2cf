//! Configuration system for rich-body.
//!
//! This crate provides configuration loading, saving, validation and default
//! values for the message body resolver. It includes:
//!
//! - Link detection settings (URL schemes, bare domains, trailing punctuation)
//! - Emoji-only classification toggle
//! - Resolution cache sizing

pub mod config;
pub mod defaults;
pub mod error;

pub use config::{CacheConfig, EmojiConfig, LinkConfig, RichBodyConfig};
pub use error::ConfigError;
