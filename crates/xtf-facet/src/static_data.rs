//! Group hierarchies read from an index field.
//!
//! Every term of the field is a group. Terms containing `::` are paths: the
//! term `Fiction::Mystery` creates (or reuses) the groups `Fiction` and
//! `Fiction::Mystery`, the latter a child of the former. Terms differing only
//! in case are collapsed: the first spelling in term order is kept and later
//! spellings are ignored.
//!
//! # Link layout
//!
//! Documents are kept in a sorted array so a document's links are found by
//! binary search. The parallel `links` array holds, for the document at
//! index `i`:
//!
//! - `links[i] >= 0`: the document's only group
//! - `links[i] < 0`: `-links[i]` is the start of an overflow run past the
//!   end of `docs`, listing the document's groups with the last one negated
//!
//! Empty terms are skipped, so no link names the root and no entry is 0.

use std::{
    borrow::Cow,
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    sync::{Arc, LazyLock},
};

use tracing::{debug, trace};

use crate::{
    DocId, GroupId, LinkId,
    cache::ReaderCache,
    error::FacetError,
    group_data::{GroupData, ROOT},
    source::{ReaderGeneration, TermSource},
};

/// Separator between the levels of a hierarchical term.
pub const PATH_SEPARATOR: &str = "::";

/// Static group data shared per (reader, field).
static CACHE: LazyLock<ReaderCache<StaticGroupData>> =
    LazyLock::new(|| ReaderCache::new("static-groups"));

/// A read-only group hierarchy built from the terms of one field.
#[derive(Debug)]
pub struct StaticGroupData {
    /// Field the groups were read from.
    field: String,
    /// Sorted ids of documents with at least one group.
    docs: Vec<DocId>,
    /// Direct links and overflow runs; see the module docs.
    links: Vec<i64>,
    /// Last path component of each group.
    names: Vec<String>,
    /// Full path -> group.
    by_path: HashMap<String, GroupId>,
    /// Parent of each group.
    parents: Vec<Option<GroupId>>,
    /// First child of each group.
    children: Vec<Option<GroupId>>,
    /// Next sibling of each group.
    siblings: Vec<Option<GroupId>>,
}

impl StaticGroupData {
    /// Returns the group data for `field`, building it on first use for
    /// this reader.
    pub fn cached(source: &dyn TermSource, field: &str) -> Result<Arc<Self>, FacetError> {
        CACHE.get_or_build(source.generation(), field, || Self::build(source, field))
    }

    /// Drops all cached group data for a reader.
    pub fn evict(reader: &ReaderGeneration) {
        CACHE.evict(reader);
    }

    /// Builds group data from the terms of `field`.
    pub fn build(source: &dyn TermSource, field: &str) -> Result<Self, FacetError> {
        let mut hierarchy = HierarchyBuilder::new();
        let mut doc_groups: BTreeMap<DocId, Vec<GroupId>> = BTreeMap::new();
        let mut seen_terms = HashSet::new();
        let mut n_terms = 0usize;
        let mut n_links = 0usize;

        source.visit_terms(field, &mut |term, docs| {
            n_terms += 1;
            if term.is_empty() || !seen_terms.insert(term.to_lowercase()) {
                trace!(field, term, "skipping duplicate term");
                return;
            }

            let group = hierarchy.add_path(term);
            for &doc in docs {
                let groups = doc_groups.entry(doc).or_default();
                // A second group moves the document to an overflow run,
                // which also needs room for the first group.
                if groups.len() == 1 {
                    n_links += 1;
                }
                groups.push(group);
                n_links += 1;
            }
        })?;

        if n_terms == 0 {
            return Err(FacetError::NoTerms {
                field: field.to_string(),
            });
        }

        let (docs, links) = build_links(&doc_groups, n_links);
        let data = hierarchy.finish(field, docs, links);
        debug!(
            field,
            groups = data.names.len(),
            docs = data.docs.len(),
            links = data.links.len(),
            "built static group data"
        );
        Ok(data)
    }

    /// Full `::` path of a group.
    pub fn path(&self, group: GroupId) -> String {
        let mut parts: Vec<&str> = Vec::new();
        let mut current = Some(group);
        while let Some(g) = current
            && g != ROOT
        {
            parts.push(&self.names[g as usize]);
            current = self.parents[g as usize];
        }
        parts.reverse();
        parts.join(PATH_SEPARATOR)
    }
}

impl GroupData for StaticGroupData {
    fn field(&self) -> &str {
        &self.field
    }

    fn n_groups(&self) -> usize {
        self.names.len()
    }

    fn name(&self, group: GroupId) -> Cow<'_, str> {
        Cow::Borrowed(&self.names[group as usize])
    }

    fn parent(&self, group: GroupId) -> Option<GroupId> {
        self.parents[group as usize]
    }

    fn child(&self, group: GroupId) -> Option<GroupId> {
        self.children[group as usize]
    }

    fn sibling(&self, group: GroupId) -> Option<GroupId> {
        self.siblings[group as usize]
    }

    fn first_link(&self, doc: DocId) -> Option<LinkId> {
        let found = self.docs.binary_search(&doc).ok()?;
        let link = self.links[found];
        if link >= 0 {
            Some(found as LinkId)
        } else {
            Some((-link) as LinkId)
        }
    }

    fn next_link(&self, link: LinkId) -> Option<LinkId> {
        let index = link as usize;
        if index < self.docs.len() || self.links[index] < 0 {
            None
        } else {
            Some(link + 1)
        }
    }

    fn link_group(&self, link: LinkId) -> GroupId {
        self.links[link as usize].unsigned_abs() as GroupId
    }

    fn find_group(&self, name: &str) -> Option<GroupId> {
        self.by_path.get(name).copied()
    }

    fn is_dynamic(&self) -> bool {
        false
    }
}

/// Accumulates groups and parent/child edges while terms are read.
struct HierarchyBuilder {
    /// Full path of each group, indexed by id.
    paths: Vec<String>,
    /// Full path -> group.
    by_path: HashMap<String, GroupId>,
    /// parent -> children, both ordered by id.
    child_sets: BTreeMap<GroupId, BTreeSet<GroupId>>,
}

impl HierarchyBuilder {
    /// Creates a builder holding only the root.
    fn new() -> Self {
        let mut builder = Self {
            paths: Vec::new(),
            by_path: HashMap::new(),
            child_sets: BTreeMap::new(),
        };
        builder.intern("");
        builder
    }

    /// Returns the group for a full path, creating it if needed.
    fn intern(&mut self, path: &str) -> GroupId {
        if let Some(&group) = self.by_path.get(path) {
            return group;
        }
        let group = self.paths.len() as GroupId;
        self.paths.push(path.to_string());
        self.by_path.insert(path.to_string(), group);
        group
    }

    /// Adds a term and all its ancestors, returning the term's group.
    fn add_path(&mut self, path: &str) -> GroupId {
        let group = self.intern(path);
        let (mut child, mut current) = (group, path);
        while !current.is_empty() {
            current = current
                .rfind(PATH_SEPARATOR)
                .map_or("", |pos| &current[..pos]);
            let parent = self.intern(current);
            // Already recorded means every higher edge is recorded too.
            if !self.child_sets.entry(parent).or_default().insert(child) {
                break;
            }
            child = parent;
        }
        group
    }

    /// Links children into sibling chains and assembles the final data.
    fn finish(self, field: &str, docs: Vec<DocId>, links: Vec<i64>) -> StaticGroupData {
        let n = self.paths.len();
        let mut parents = vec![None; n];
        let mut children = vec![None; n];
        let mut siblings = vec![None; n];

        for (&parent, kids) in &self.child_sets {
            let mut prev: Option<GroupId> = None;
            for &kid in kids {
                parents[kid as usize] = Some(parent);
                match prev {
                    None => children[parent as usize] = Some(kid),
                    Some(p) => siblings[p as usize] = Some(kid),
                }
                prev = Some(kid);
            }
        }

        let names = self
            .paths
            .iter()
            .map(|path| match path.rfind(PATH_SEPARATOR) {
                Some(pos) => path[pos + PATH_SEPARATOR.len()..].to_string(),
                None => path.clone(),
            })
            .collect();

        StaticGroupData {
            field: field.to_string(),
            docs,
            links,
            names,
            by_path: self.by_path,
            parents,
            children,
            siblings,
        }
    }
}

/// Lays out the sorted document array and the link array.
fn build_links(doc_groups: &BTreeMap<DocId, Vec<GroupId>>, n_links: usize) -> (Vec<DocId>, Vec<i64>) {
    let docs: Vec<DocId> = doc_groups.keys().copied().collect();
    let mut links = vec![0i64; n_links];
    let mut top = docs.len();

    for (i, groups) in doc_groups.values().enumerate() {
        if let [only] = groups.as_slice() {
            links[i] = i64::from(*only);
            continue;
        }
        links[i] = -(top as i64);
        for (j, &group) in groups.iter().enumerate() {
            let group = i64::from(group);
            links[top] = if j + 1 == groups.len() { -group } else { group };
            top += 1;
        }
    }
    debug_assert_eq!(top, links.len(), "link count mismatch");

    (docs, links)
}
