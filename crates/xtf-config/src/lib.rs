//! Configuration system for xtf.
//!
//! xtf reads a single TOML file, `xtf.toml` by default, describing where the
//! search index lives and which facets to compute for every query:
//!
//! ```toml
//! [index]
//! path = "./index"
//! default_fields = ["text"]
//!
//! [[facet]]
//! field = "subject"
//! select = "*[topChoices]#1-10"
//! sort_groups_by = "totalDocs"
//! ```
//!
//! Paths are resolved relative to the directory containing the config file.

#![warn(missing_docs)]

mod error;
mod parse;
#[cfg(test)]
mod test_support;
mod validate;

use std::{
    collections::HashSet,
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

pub use error::ConfigError;
pub use parse::{RawConfig, RawFacet, RawIndexSettings, parse_config_file, parse_config_str};
use serde::{Deserialize, Serialize};
pub use validate::ConfigWarning;
use validate::validate_config;

/// Default name of the configuration file.
pub const CONFIG_FILENAME: &str = "xtf.toml";

/// Prefix marking a facet field as a query-time (dynamic) grouping.
pub const DYNAMIC_PREFIX: &str = "dynamic:";

/// Fully resolved configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Index settings.
    pub index: IndexSettings,
    /// Facets computed for every query, in file order.
    pub facets: Vec<FacetSettings>,
    /// The file this configuration was loaded from, if any.
    pub source: Option<PathBuf>,
}

impl Config {
    /// Loads and resolves a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = parse_config_file(path)?;
        Self::from_raw(raw, Some(path))
    }

    /// Parses and resolves configuration from a TOML string.
    ///
    /// `path` is used for error reporting and to resolve relative paths.
    pub fn from_toml(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let raw = parse_config_str(contents, path)?;
        Self::from_raw(raw, Some(path))
    }

    /// Applies defaults to a raw configuration and checks facet definitions.
    pub fn from_raw(raw: RawConfig, source: Option<&Path>) -> Result<Self, ConfigError> {
        let base = source.and_then(Path::parent);
        let index = IndexSettings::from_raw(raw.index.unwrap_or_default(), base);

        let mut seen = HashSet::new();
        let mut facets = Vec::new();
        for (i, raw_facet) in raw.facet.unwrap_or_default().into_iter().enumerate() {
            let facet = FacetSettings::from_raw(raw_facet, i + 1)?;
            if !seen.insert(facet.field.to_lowercase()) {
                return Err(ConfigError::DuplicateFacet { field: facet.field });
            }
            facets.push(facet);
        }

        Ok(Self {
            index,
            facets,
            source: source.map(Path::to_path_buf),
        })
    }

    /// Returns the facet for `field`, compared case-insensitively.
    pub fn facet(&self, field: &str) -> Option<&FacetSettings> {
        self.facets
            .iter()
            .find(|facet| facet.field.eq_ignore_ascii_case(field))
    }

    /// Validates the configuration and returns any warnings.
    ///
    /// This checks for:
    /// - Configurations with no facets
    /// - Document orderings other than by score
    /// - Dynamic facets asking for empty groups
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }
}

/// Index location and query defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSettings {
    /// Index directory.
    pub path: PathBuf,
    /// Fields searched by queries without a field prefix.
    pub default_fields: Vec<String>,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("index"),
            default_fields: vec![String::from("text")],
        }
    }
}

impl IndexSettings {
    /// Applies defaults, resolving a relative path against `base`.
    fn from_raw(raw: RawIndexSettings, base: Option<&Path>) -> Self {
        let defaults = Self::default();
        let path = raw.path.map_or(defaults.path, PathBuf::from);
        let path = match base {
            Some(base) if path.is_relative() && !base.as_os_str().is_empty() => base.join(path),
            _ => path,
        };
        Self {
            path,
            default_fields: raw.default_fields.unwrap_or(defaults.default_fields),
        }
    }
}

/// One facet definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetSettings {
    /// Index field to group on, or a `dynamic:` grouping.
    pub field: String,
    /// Selection expression; empty selects only the root group.
    pub select: String,
    /// Ordering of sibling groups.
    pub sort_groups_by: SortGroupsBy,
    /// Whether groups without hits are rendered.
    pub include_empty_groups: bool,
    /// Ordering of document hits inside a group.
    pub sort_docs_by: String,
}

impl FacetSettings {
    /// Creates settings for `field` with every option at its default.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            select: String::new(),
            sort_groups_by: SortGroupsBy::default(),
            include_empty_groups: false,
            sort_docs_by: String::from("score"),
        }
    }

    /// Returns true if the field describes a query-time grouping.
    pub fn is_dynamic(&self) -> bool {
        self.field.starts_with(DYNAMIC_PREFIX)
    }

    /// Applies defaults to a raw facet table.
    fn from_raw(raw: RawFacet, index: usize) -> Result<Self, ConfigError> {
        let field = raw
            .field
            .filter(|field| !field.trim().is_empty())
            .ok_or(ConfigError::MissingFacetField { index })?;
        let Self {
            field,
            select,
            sort_groups_by,
            include_empty_groups,
            sort_docs_by,
        } = Self::new(field);
        Ok(Self {
            field,
            select: raw.select.unwrap_or(select),
            sort_groups_by: raw.sort_groups_by.unwrap_or(sort_groups_by),
            include_empty_groups: raw.include_empty_groups.unwrap_or(include_empty_groups),
            sort_docs_by: raw.sort_docs_by.unwrap_or(sort_docs_by),
        })
    }
}

/// How sibling groups are ordered in a facet result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortGroupsBy {
    /// Ascending group value.
    Value,
    /// Descending group value.
    ReverseValue,
    /// Descending document count.
    #[default]
    TotalDocs,
    /// Descending best document score.
    MaxDocScore,
}

impl SortGroupsBy {
    /// All orderings, in the order they are documented.
    pub const ALL: [Self; 4] = [
        Self::Value,
        Self::ReverseValue,
        Self::TotalDocs,
        Self::MaxDocScore,
    ];

    /// The name used in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::ReverseValue => "reverseValue",
            Self::TotalDocs => "totalDocs",
            Self::MaxDocScore => "maxDocScore",
        }
    }
}

impl fmt::Display for SortGroupsBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortGroupsBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown option for sortGroupsBy: '{s}' (expected value, reverseValue, totalDocs or maxDocScore)"
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestDir;

    #[test]
    fn index_defaults() {
        let index = IndexSettings::default();
        assert_eq!(index.path, PathBuf::from("index"));
        assert_eq!(index.default_fields, vec!["text".to_string()]);
    }

    #[test]
    fn facet_defaults() {
        let facet = FacetSettings::new("subject");
        assert_eq!(facet.select, "");
        assert_eq!(facet.sort_groups_by, SortGroupsBy::TotalDocs);
        assert!(!facet.include_empty_groups);
        assert_eq!(facet.sort_docs_by, "score");
        assert!(!facet.is_dynamic());
        assert!(FacetSettings::new("dynamic:frbr(title)").is_dynamic());
    }

    #[test]
    fn sort_groups_by_names() {
        for kind in SortGroupsBy::ALL {
            assert_eq!(kind.as_str().parse::<SortGroupsBy>().unwrap(), kind);
        }
        let err = "count".parse::<SortGroupsBy>().unwrap_err();
        assert!(err.contains("'count'"));
    }

    #[test]
    fn load_resolves_relative_index_path() {
        let dir = TestDir::new();
        let config_path = dir.write_config("[index]\npath = \"idx\"\n");
        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.index.path, dir.path().join("idx"));
        assert_eq!(config.source.as_deref(), Some(config_path.as_path()));
    }

    #[test]
    fn load_keeps_absolute_index_path() {
        let dir = TestDir::new();
        let absolute = dir.path().join("elsewhere");
        let config_path =
            dir.write_config(&format!("[index]\npath = \"{}\"\n", absolute.display()));
        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.index.path, absolute);
    }

    #[test]
    fn missing_facet_field() {
        let err = Config::from_toml("[[facet]]\nselect = \"*\"\n", Path::new("xtf.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingFacetField { index: 1 }));
    }

    #[test]
    fn duplicate_facet_is_case_insensitive() {
        let err = Config::from_toml(
            "[[facet]]\nfield = \"Subject\"\n[[facet]]\nfield = \"subject\"\n",
            Path::new("xtf.toml"),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateFacet { ref field } if field == "subject"));
    }

    #[test]
    fn facet_lookup() {
        let config = Config::from_toml(
            "[[facet]]\nfield = \"Subject\"\nselect = \"*\"\n",
            Path::new("xtf.toml"),
        )
        .unwrap();
        assert_eq!(config.facet("subject").unwrap().select, "*");
        assert!(config.facet("author").is_none());
    }
}
