//! Typed error variants for the rich-body-config crate.
//!
//! Config I/O and validation are the only fallible operations in rich-body;
//! the resolver core itself never fails.

use thiserror::Error;

/// Errors that can occur when loading, saving or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An I/O error occurred reading or writing the config file.
    #[error("I/O error accessing config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file contained invalid YAML, or the config could not be serialized.
    #[error("YAML error in config: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    /// A field value failed semantic validation.
    ///
    /// The inner string describes which field is invalid and why.
    #[error("Config validation error: {0}")]
    Validation(String),
}
