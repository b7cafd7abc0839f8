//! Configuration validation.
//!
//! Validates a loaded configuration and reports warnings for potential issues.

use std::fmt;

use crate::{Config, FacetSettings};

/// Document orderings the query front end knows how to apply.
const SUPPORTED_DOC_SORTS: &[&str] = &["score"];

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// No facets are defined.
    NoFacetsDefined,
    /// A facet asks for a document ordering that is not implemented.
    UnsupportedSortDocsBy {
        /// Facet field.
        field: String,
        /// The requested ordering.
        sort: String,
    },
    /// A dynamic facet asks for empty groups, which it never produces.
    EmptyGroupsOnDynamicFacet {
        /// Facet field.
        field: String,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFacetsDefined => write!(f, "no facets are defined in configuration"),
            Self::UnsupportedSortDocsBy { field, sort } => {
                write!(
                    f,
                    "facet '{field}' sorts documents by '{sort}'; only score ordering is supported"
                )
            }
            Self::EmptyGroupsOnDynamicFacet { field } => {
                write!(
                    f,
                    "facet '{field}' is dynamic and never has empty groups; include_empty_groups has no effect"
                )
            }
        }
    }
}

/// Validates the configuration and returns any warnings.
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    if config.facets.is_empty() {
        return vec![ConfigWarning::NoFacetsDefined];
    }

    config.facets.iter().flat_map(validate_facet).collect()
}

/// Validates a single facet definition.
fn validate_facet(facet: &FacetSettings) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    if !SUPPORTED_DOC_SORTS.contains(&facet.sort_docs_by.as_str()) {
        warnings.push(ConfigWarning::UnsupportedSortDocsBy {
            field: facet.field.clone(),
            sort: facet.sort_docs_by.clone(),
        });
    }

    if facet.is_dynamic() && facet.include_empty_groups {
        warnings.push(ConfigWarning::EmptyGroupsOnDynamicFacet {
            field: facet.field.clone(),
        });
    }

    warnings
}
