//! `RichBodyConfig` — resolver settings, persistence and validation.
//!
//! Maps to `~/.config/rich-body/config.yaml`:
//!
//! ```yaml
//! links:
//!   schemes: [https, http, ftp]
//!   bare_domains: true
//!   trailing_punctuation: ".,;:!?。、，；：！？"
//! emoji:
//!   detect_emoji_only: true
//! cache:
//!   max_entries: 256
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings for the link boundary scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// URL schemes recognized as link starts when followed by `://`.
    #[serde(default = "crate::defaults::link_schemes")]
    pub schemes: Vec<String>,

    /// Recognize scheme-less domains such as `example.com/path`.
    #[serde(default = "crate::defaults::bool_true")]
    pub bare_domains: bool,

    /// Characters stripped one at a time from the end of a link.
    /// Parentheses are not allowed here; they are balanced instead.
    #[serde(default = "crate::defaults::trailing_punctuation")]
    pub trailing_punctuation: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            schemes: crate::defaults::link_schemes(),
            bare_domains: crate::defaults::bool_true(),
            trailing_punctuation: crate::defaults::trailing_punctuation(),
        }
    }
}

/// Settings for emoji-only body classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiConfig {
    /// Flag bodies made only of emoji so the renderer can pick a larger style.
    #[serde(default = "crate::defaults::bool_true")]
    pub detect_emoji_only: bool,
}

impl Default for EmojiConfig {
    fn default() -> Self {
        Self {
            detect_emoji_only: crate::defaults::bool_true(),
        }
    }
}

/// Settings for the resolved-body memo cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of message bodies kept resolved.
    #[serde(default = "crate::defaults::cache_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: crate::defaults::cache_max_entries(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichBodyConfig {
    #[serde(default)]
    pub links: LinkConfig,

    #[serde(default)]
    pub emoji: EmojiConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

impl RichBodyConfig {
    /// Load configuration from the default path, falling back to defaults
    /// when the file does not exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            log::info!(
                "Config file not found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load and validate configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        log::debug!("Loading config from {:?}", path);
        let contents = fs::read_to_string(path)?;
        let config: RichBodyConfig = serde_yaml_ng::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml_ng::to_string(self)?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Get the configuration file path (using XDG convention)
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Get the configuration directory path (using XDG convention)
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join("rich-body")
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join("rich-body")
            } else {
                PathBuf::from(".")
            }
        }
    }

    /// Check field values that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.max_entries == 0 {
            return Err(ConfigError::Validation(
                "cache.max_entries must be at least 1".to_string(),
            ));
        }

        for scheme in &self.links.schemes {
            let valid = !scheme.is_empty()
                && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
            if !valid {
                return Err(ConfigError::Validation(format!(
                    "links.schemes contains invalid scheme '{scheme}'"
                )));
            }
        }

        if let Some(bad) = self
            .links
            .trailing_punctuation
            .chars()
            .find(|c| matches!(c, '(' | ')') || c.is_whitespace())
        {
            return Err(ConfigError::Validation(format!(
                "links.trailing_punctuation may not contain {bad:?}"
            )));
        }

        Ok(())
    }
}
