//! Tag tables and document/tag links for FRBR clustering.

use std::{
    sync::{Arc, LazyLock},
    time::Instant,
};

use tracing::debug;

use crate::{
    DocId,
    cache::ReaderCache,
    error::FacetError,
    frbr::tags::{TagId, TagInterner, TagKind, TagTable, normalize_term},
    source::{ReaderGeneration, TermSource},
};

/// FRBR data shared per (reader, field list).
static CACHE: LazyLock<ReaderCache<FrbrData>> = LazyLock::new(|| ReaderCache::new("frbr"));

/// A compact one-to-many map from dense keys to sorted value lists.
#[derive(Debug, Default)]
struct MultiMap {
    /// `values[offsets[k]..offsets[k + 1]]` belongs to key `k`.
    offsets: Vec<u32>,
    /// Concatenated value lists.
    values: Vec<u32>,
}

impl MultiMap {
    /// Packs per-key lists. Each list must already be sorted.
    fn from_lists(lists: &[Vec<u32>]) -> Self {
        let mut offsets = Vec::with_capacity(lists.len() + 1);
        let mut values = Vec::with_capacity(lists.iter().map(Vec::len).sum());
        offsets.push(0);
        for list in lists {
            values.extend_from_slice(list);
            offsets.push(values.len() as u32);
        }
        Self { offsets, values }
    }

    /// Values of `key`, empty if the key is out of range.
    fn get(&self, key: u32) -> &[u32] {
        let key = key as usize;
        if key + 1 >= self.offsets.len() {
            return &[];
        }
        &self.values[self.offsets[key] as usize..self.offsets[key + 1] as usize]
    }
}

/// Interned tags for a set of fields, with links in both directions.
#[derive(Debug)]
pub struct FrbrData {
    /// All tags, in (kind, text) order.
    tags: TagTable,
    /// doc -> tags, sorted by tag id.
    doc_tags: MultiMap,
    /// tag -> docs, ascending.
    tag_docs: MultiMap,
}

impl FrbrData {
    /// Returns the data for `fields`, building it on first use for this
    /// reader.
    pub fn cached(source: &dyn TermSource, fields: &[String]) -> Result<Arc<Self>, FacetError> {
        let key = fields.join("|");
        CACHE.get_or_build(source.generation(), &key, || Self::build(source, fields))
    }

    /// Drops all cached FRBR data for a reader.
    pub fn evict(reader: &ReaderGeneration) {
        CACHE.evict(reader);
    }

    /// Reads and interns the terms of every field.
    pub fn build(source: &dyn TermSource, fields: &[String]) -> Result<Self, FacetError> {
        let started = Instant::now();
        let kinds = fields
            .iter()
            .map(|field| TagKind::classify(field))
            .collect::<Result<Vec<_>, _>>()?;

        let mut interner = TagInterner::default();
        let mut edges: Vec<(DocId, TagId)> = Vec::new();
        let mut max_doc = source.max_doc();

        for (field, &kind) in fields.iter().zip(&kinds) {
            let mut n_terms = 0usize;
            let before = edges.len();
            source.visit_terms(field, &mut |term, docs| {
                n_terms += 1;
                let Some(text) = normalize_term(term, kind) else {
                    return;
                };
                let tag = interner.intern(kind, text);
                for &doc in docs {
                    edges.push((doc, tag));
                    max_doc = max_doc.max(doc + 1);
                }
            })?;

            if n_terms == 0 {
                return Err(FacetError::NoTerms {
                    field: field.clone(),
                });
            }
            debug!(
                field = field.as_str(),
                ?kind,
                terms = n_terms,
                links = edges.len() - before,
                "read FRBR field"
            );
        }

        let (tags, remap) = interner.finish();

        let mut by_doc: Vec<Vec<u32>> = vec![Vec::new(); max_doc as usize];
        for &(doc, tag) in &edges {
            by_doc[doc as usize].push(remap[tag as usize]);
        }
        for list in &mut by_doc {
            list.sort_unstable();
            list.dedup();
        }

        // Walking documents in order keeps every tag's doc list ascending.
        let mut by_tag: Vec<Vec<u32>> = vec![Vec::new(); tags.len()];
        for (doc, list) in by_doc.iter().enumerate() {
            for &tag in list {
                by_tag[tag as usize].push(doc as DocId);
            }
        }

        let data = Self {
            doc_tags: MultiMap::from_lists(&by_doc),
            tag_docs: MultiMap::from_lists(&by_tag),
            tags,
        };
        debug!(
            fields = %fields.join("|"),
            tags = data.tags.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "built FRBR data"
        );
        Ok(data)
    }

    /// The tag table.
    pub fn tags(&self) -> &TagTable {
        &self.tags
    }

    /// Tags of a document, sorted by id.
    pub fn doc_tags(&self, doc: DocId) -> &[TagId] {
        self.doc_tags.get(doc)
    }

    /// Tags of a document restricted to one kind.
    pub fn doc_tags_of(&self, doc: DocId, kind: TagKind) -> &[TagId] {
        let tags = self.doc_tags(doc);
        // Ids are grouped by kind, so each kind is one contiguous run.
        let start = tags.partition_point(|&t| self.tags.kind(t) < kind);
        let end = tags.partition_point(|&t| self.tags.kind(t) <= kind);
        &tags[start..end]
    }

    /// Lexically first tag of one kind on a document.
    pub fn first_tag_of(&self, doc: DocId, kind: TagKind) -> Option<TagId> {
        self.doc_tags_of(doc, kind).first().copied()
    }

    /// Documents carrying a tag, ascending.
    pub fn tag_docs(&self, tag: TagId) -> &[DocId] {
        self.tag_docs.get(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryIndex;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn catalog() -> MemoryIndex {
        let mut index = MemoryIndex::new();
        index
            .add(0, "title", "Moby Dick")
            .add(1, "title", "Moby Dick [245]")
            .add(2, "title", "Typee")
            .add(2, "title", "Typee [246]")
            .add(0, "author", "Melville")
            .add(2, "author", "Melville [700]")
            .add(1, "year", "1851");
        index
    }

    #[test]
    fn links_in_both_directions() {
        let index = catalog();
        let data = FrbrData::build(&index, &fields(&["title", "author", "year"])).unwrap();

        let moby = data.tags().find(TagKind::Title, "Moby Dick").unwrap();
        let melville = data.tags().find(TagKind::Author, "Melville").unwrap();
        assert_eq!(data.tag_docs(moby), &[0, 1]);
        assert_eq!(data.tag_docs(melville), &[0, 2]);
        assert_eq!(data.doc_tags(0), &[moby, melville]);

        // Typee [246] is dropped, plain Typee kept.
        let typee = data.tags().find(TagKind::Title, "Typee").unwrap();
        assert_eq!(data.doc_tags_of(2, TagKind::Title), &[typee]);
        assert_eq!(data.first_tag_of(1, TagKind::Author), None);
        assert!(data.first_tag_of(1, TagKind::Date).is_some());
    }

    #[test]
    fn unknown_field_kind_fails_before_reading() {
        let index = catalog();
        let err = FrbrData::build(&index, &fields(&["title", "subject"])).unwrap_err();
        assert!(matches!(err, FacetError::UnknownFieldType { field } if field == "subject"));
    }

    #[test]
    fn field_without_terms_fails() {
        let mut index = catalog();
        index.add_field("id");
        let err = FrbrData::build(&index, &fields(&["title", "id"])).unwrap_err();
        assert!(matches!(err, FacetError::NoTerms { field } if field == "id"));
    }

    #[test]
    fn out_of_range_doc_has_no_tags() {
        let index = catalog();
        let data = FrbrData::build(&index, &fields(&["title"])).unwrap();
        assert!(data.doc_tags(99).is_empty());
    }

    #[test]
    fn cached_per_field_list() {
        let index = catalog();
        let a = FrbrData::cached(&index, &fields(&["title", "author"])).unwrap();
        let b = FrbrData::cached(&index, &fields(&["title", "author"])).unwrap();
        let c = FrbrData::cached(&index, &fields(&["title"])).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
