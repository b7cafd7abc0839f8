//! Configuration file parsing.
//!
//! Parses `xtf.toml` files into intermediate `RawConfig` structures that keep
//! every field optional, so defaults are applied in one place when the final
//! [`Config`](crate::Config) is built.

use std::{fs, path::Path};

use serde::Deserialize;
use serde_with::{OneOrMany, serde_as};

use crate::{ConfigError, SortGroupsBy};

/// Raw configuration as parsed directly from a TOML file.
///
/// This mirrors the TOML schema exactly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    /// Index settings section.
    pub index: Option<RawIndexSettings>,
    /// Facet definitions, one `[[facet]]` table each.
    pub facet: Option<Vec<RawFacet>>,
}

/// Raw index settings.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawIndexSettings {
    /// Index directory, relative to the config file.
    pub path: Option<String>,
    /// Fields searched by queries without a field prefix.
    /// Accepts either a single string or an array of strings.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub default_fields: Option<Vec<String>>,
}

/// Raw facet definition from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawFacet {
    /// Index field to group on, or a `dynamic:` grouping.
    pub field: Option<String>,
    /// Selection expression.
    pub select: Option<String>,
    /// Ordering of sibling groups.
    pub sort_groups_by: Option<SortGroupsBy>,
    /// Whether groups without hits are rendered.
    pub include_empty_groups: Option<bool>,
    /// Ordering of document hits inside a group.
    pub sort_docs_by: Option<String>,
}

/// Parses a configuration file from disk.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}
