//! Hierarchical facet grouping and FRBR clustering for xtf.
//!
//! A facet groups the documents matching a query by the values of one index
//! field. This crate handles:
//! - Reading group hierarchies from `::`-separated field terms
//! - Clustering result sets into FRBR works (`dynamic:frbr(...)` facets)
//! - Counting matching documents per group, ancestors included
//! - Selecting groups for display with compiled selection expressions
//! - Sorting sibling groups and collecting the top hits of selected groups
//!
//! # Example
//!
//! ```
//! use xtf_facet::{FacetSpec, MemoryIndex, ResultFacet, ScoredHit};
//!
//! let mut index = MemoryIndex::new();
//! index
//!     .add(0, "subject", "Fiction::Mystery")
//!     .add(1, "subject", "Fiction")
//!     .add(2, "subject", "Nonfiction");
//!
//! let spec = FacetSpec::new("subject").with_select("*#1-5").unwrap();
//! let hits = [ScoredHit::new(0, 1.0), ScoredHit::new(1, 0.5)];
//! let facet: ResultFacet<ScoredHit> = spec.evaluate(&index, &hits).unwrap();
//!
//! assert_eq!(facet.root_group.total_docs, 2);
//! assert_eq!(facet.root_group.sub_groups[0].value, "Fiction");
//! ```

#![warn(missing_docs)]

mod cache;
mod counts;
mod error;
mod facet;
mod frbr;
mod group_data;
mod hit;
mod memory;
mod selector;
mod source;
mod static_data;
mod tantivy_source;

pub use counts::{GroupCounts, MAX_SORTABLE_GROUPS, ResultFacet, ResultGroup, Selection};
pub use error::FacetError;
pub use facet::{DynamicField, FacetGroups, FacetSpec};
pub use frbr::{
    FRBR_FIELD, FrbrCollector, FrbrData, FrbrGroupData, FrbrParams, Tag, TagId, TagKind, TagTable,
    normalize_term,
};
pub use group_data::{Children, GroupData, Links, ROOT};
pub use hit::{DocHitMaker, HitQueue, ScoredHit, UNLIMITED_DOCS};
pub use memory::MemoryIndex;
pub use selector::{
    ChildSelector, DescendantSelector, DocsSelector, GroupContext, GroupSelector, MarkSelector,
    NameSelector, Next, RangeSelector, RootSelector, SelectorChain, SiblingSelector,
    TopChoiceSelector, UnionSelector, compile as compile_selection,
};
pub use source::{ReaderGeneration, TermSource};
pub use static_data::{PATH_SEPARATOR, StaticGroupData};
pub use tantivy_source::TantivySource;

/// Index-wide document id.
pub type DocId = u32;

/// Group id within one facet's hierarchy. The root is [`ROOT`].
pub type GroupId = u32;

/// Position in a group data's link table.
pub type LinkId = u32;

/// Drops all group data cached for a reader, static and FRBR alike.
pub fn evict_reader(reader: &ReaderGeneration) {
    StaticGroupData::evict(reader);
    FrbrData::evict(reader);
}
