//! Error types for the xtf-facet crate.

use std::io;

use thiserror::Error;
use xtf_select::SelectError;

use crate::DocId;

/// Errors that can occur while building group data or counting groups.
#[derive(Debug, Error)]
pub enum FacetError {
    /// A field used for grouping has no terms at all.
    #[error("no terms in field {field}")]
    NoTerms {
        /// The empty field.
        field: String,
    },

    /// The index schema has no such field.
    #[error("unknown field: {field}")]
    UnknownField {
        /// The missing field.
        field: String,
    },

    /// A FRBR field name does not identify a title, author, date or id field.
    #[error("unable to identify field type: '{field}'")]
    UnknownFieldType {
        /// The unclassifiable field.
        field: String,
    },

    /// A FRBR parameter list contains an unrecognized `[...]` directive.
    #[error("unknown control marker: {directive}")]
    UnknownDirective {
        /// The offending token.
        directive: String,
    },

    /// Documents were collected out of ascending order.
    #[error("docs out of order: {doc} collected after {previous}")]
    DocsOutOfOrder {
        /// The previously collected document.
        previous: DocId,
        /// The document that arrived too late.
        doc: DocId,
    },

    /// More groups than a count-based sort can order.
    #[error("too many groups to sort: {count} (limit {limit})")]
    TooManyGroups {
        /// Groups in the facet.
        count: usize,
        /// Largest supported group count.
        limit: usize,
    },

    /// A `dynamic:` facet field is malformed or names an unknown grouping.
    #[error("invalid dynamic facet '{field}': {reason}")]
    InvalidDynamicField {
        /// The facet field as written.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The facet selection expression is invalid.
    #[error(transparent)]
    Select(#[from] SelectError),

    /// The search index reported an error.
    #[error("index error: {0}")]
    Index(String),

    /// I/O error reading postings.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl FacetError {
    /// Creates an `Index` error from a Tantivy error.
    pub(crate) fn index(source: &tantivy::TantivyError) -> Self {
        Self::Index(source.to_string())
    }
}
