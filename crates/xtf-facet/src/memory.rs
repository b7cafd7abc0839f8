//! In-memory term source.
//!
//! Useful for small collections, tests, and callers that compute facet
//! values outside a search index.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use crate::{
    DocId,
    error::FacetError,
    source::{ReaderGeneration, TermSource},
};

/// Postings held in memory, keyed by field and then by term.
#[derive(Debug)]
pub struct MemoryIndex {
    /// Identity of this index.
    generation: Arc<ReaderGeneration>,
    /// field -> term -> docs
    fields: BTreeMap<String, BTreeMap<String, BTreeSet<DocId>>>,
    /// One more than the largest document added.
    max_doc: DocId,
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            generation: ReaderGeneration::new(),
            fields: BTreeMap::new(),
            max_doc: 0,
        }
    }

    /// Declares a field without adding any terms to it.
    pub fn add_field(&mut self, field: &str) -> &mut Self {
        self.fields.entry(field.to_string()).or_default();
        self
    }

    /// Records that `doc` contains `term` in `field`.
    pub fn add(&mut self, doc: DocId, field: &str, term: &str) -> &mut Self {
        self.fields
            .entry(field.to_string())
            .or_default()
            .entry(term.to_string())
            .or_default()
            .insert(doc);
        self.max_doc = self.max_doc.max(doc + 1);
        self
    }

    /// Extends the document space without adding postings.
    pub fn set_max_doc(&mut self, max_doc: DocId) -> &mut Self {
        self.max_doc = self.max_doc.max(max_doc);
        self
    }
}

impl TermSource for MemoryIndex {
    fn generation(&self) -> &Arc<ReaderGeneration> {
        &self.generation
    }

    fn max_doc(&self) -> DocId {
        self.max_doc
    }

    fn visit_terms(
        &self,
        field: &str,
        visitor: &mut dyn FnMut(&str, &[DocId]),
    ) -> Result<(), FacetError> {
        let terms = self
            .fields
            .get(field)
            .ok_or_else(|| FacetError::UnknownField {
                field: field.to_string(),
            })?;

        for (term, docs) in terms {
            if docs.is_empty() {
                continue;
            }
            let docs: Vec<DocId> = docs.iter().copied().collect();
            visitor(term, &docs);
        }

        Ok(())
    }
}
