//! Term enumeration over an index reader.
//!
//! Group data is built from the sorted term dictionary of a field and the
//! postings of each term. [`TermSource`] is that view of an index reader, and
//! [`ReaderGeneration`] is the reader's identity for caching: derived data is
//! keyed on the generation and dropped once every handle to it is gone.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use crate::{DocId, error::FacetError};

/// Source of fresh generation ids.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Identity token of one opened index reader.
///
/// Each call to [`ReaderGeneration::new`] yields a distinct identity, so a
/// reopened index never sees data cached for its predecessor.
#[derive(Debug)]
pub struct ReaderGeneration {
    /// Process-unique id.
    id: u64,
}

impl ReaderGeneration {
    /// Creates a new, unique reader identity.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            id: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
        })
    }

    /// Process-unique id of this generation.
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Read access to the terms and postings of an index.
pub trait TermSource {
    /// Identity of the underlying reader.
    fn generation(&self) -> &Arc<ReaderGeneration>;

    /// One more than the largest document id in the reader.
    fn max_doc(&self) -> DocId;

    /// Calls `visitor` for each term of `field` in ascending term order, with
    /// the ascending ids of the live documents containing it.
    ///
    /// Terms without live documents are skipped. A field that exists but has
    /// no terms produces no calls.
    fn visit_terms(
        &self,
        field: &str,
        visitor: &mut dyn FnMut(&str, &[DocId]),
    ) -> Result<(), FacetError>;
}
