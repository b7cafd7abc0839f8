//! Error types for xtf configuration.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use toml::de;

/// Errors that can occur when loading or processing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("failed to parse config file {path}: {source}")]
    ParseToml {
        /// Path to the file that could not be parsed.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: de::Error,
    },

    /// A `[[facet]]` table has no `field`.
    #[error("facet #{index} has no field")]
    MissingFacetField {
        /// 1-based position of the facet in the file.
        index: usize,
    },

    /// Two facets name the same field (compared case-insensitively).
    #[error("facet field '{field}' is defined more than once")]
    DuplicateFacet {
        /// The repeated field name.
        field: String,
    },
}
