//! [`TermSource`] over a Tantivy searcher.
//!
//! Facet code works with index-wide document ids. Tantivy numbers documents
//! per segment, so segments are laid end to end in segment order: a
//! document's global id is its segment's base plus its local id.

use std::{collections::BTreeMap, str, sync::Arc};

use tantivy::{
    DocAddress, DocSet, Searcher, TERMINATED, schema::IndexRecordOption,
};
use tracing::trace;

use crate::{
    DocId,
    error::FacetError,
    source::{ReaderGeneration, TermSource},
};

/// Term access to one opened Tantivy searcher.
///
/// Every source gets its own generation, so group data cached for it is
/// shared by every query run through the same source and dropped with it.
pub struct TantivySource {
    /// The searcher being read.
    searcher: Searcher,
    /// Cache identity.
    generation: Arc<ReaderGeneration>,
    /// First global id of each segment.
    bases: Vec<DocId>,
    /// Total documents across segments, deleted ones included.
    max_doc: DocId,
}

impl TantivySource {
    /// Wraps a searcher.
    pub fn new(searcher: Searcher) -> Self {
        let mut bases = Vec::with_capacity(searcher.segment_readers().len());
        let mut max_doc = 0;
        for segment in searcher.segment_readers() {
            bases.push(max_doc);
            max_doc += segment.max_doc();
        }
        Self {
            searcher,
            generation: ReaderGeneration::new(),
            bases,
            max_doc,
        }
    }

    /// The wrapped searcher.
    pub fn searcher(&self) -> &Searcher {
        &self.searcher
    }

    /// Index-wide id of a document address.
    pub fn global_doc(&self, address: DocAddress) -> DocId {
        self.bases[address.segment_ord as usize] + address.doc_id
    }

    /// Segment address of an index-wide id.
    pub fn doc_address(&self, doc: DocId) -> DocAddress {
        let segment = self.bases.partition_point(|&base| base <= doc).saturating_sub(1);
        DocAddress::new(segment as u32, doc - self.bases.get(segment).copied().unwrap_or(0))
    }
}

impl TermSource for TantivySource {
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
        let schema_field =
            self.searcher
                .schema()
                .get_field(field)
                .map_err(|_| FacetError::UnknownField {
                    field: field.to_string(),
                })?;

        // Segments each hold a sorted dictionary; merging them keeps the
        // visit in global term order.
        let mut terms: BTreeMap<String, Vec<DocId>> = BTreeMap::new();
        for (segment, reader) in self.searcher.segment_readers().iter().enumerate() {
            let base = self.bases[segment];
            let inverted_index = reader
                .inverted_index(schema_field)
                .map_err(|e| FacetError::index(&e))?;
            let alive = reader.alive_bitset();

            let mut stream = inverted_index.terms().stream()?;
            while stream.advance() {
                let Ok(term) = str::from_utf8(stream.key()) else {
                    trace!(field, "skipping non-UTF-8 term");
                    continue;
                };
                let mut postings = inverted_index
                    .read_postings_from_terminfo(stream.value(), IndexRecordOption::Basic)?;

                let docs = terms.entry(term.to_string()).or_default();
                let mut doc = postings.doc();
                while doc != TERMINATED {
                    if alive.is_none_or(|bits| bits.is_alive(doc)) {
                        docs.push(base + doc);
                    }
                    doc = postings.advance();
                }
            }
        }

        for (term, docs) in &terms {
            if !docs.is_empty() {
                visitor(term, docs);
            }
        }
        Ok(())
    }
}
