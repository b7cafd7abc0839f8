//! Per-query FRBR work clustering.
//!
//! Documents of a result set are collected in ascending order, then
//! clustered once: each ungrouped document seeds a group and absorbs every
//! other result document that shares a title tag with it and scores high
//! enough across all fields. The groups form a single level under the root.

use std::{borrow::Cow, cmp::Ordering, sync::Arc};

use tracing::{debug, trace};

use crate::{
    DocId, GroupId, LinkId,
    error::FacetError,
    frbr::{
        data::FrbrData,
        tags::{TagId, TagKind},
    },
    group_data::{GroupData, ROOT},
    source::TermSource,
};

/// Field name reported by FRBR group data.
pub const FRBR_FIELD: &str = "dynamicFRBR";

/// Prefix of generated group names.
const GROUP_PREFIX: &str = "group-";

/// Characters separating entries of a parameter string.
const PARAM_SEPARATORS: &[char] = &[' ', '\t', ',', ';', '|'];

/// Title score needed to keep scanning neighbouring title tags.
const TITLE_SCAN_THRESHOLD: u32 = 50;

/// Summed field score needed for two documents to share a group.
const MATCH_THRESHOLD: u32 = 200;

/// Parsed FRBR parameters: the fields to read and how to order groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrbrParams {
    /// Index fields to read tags from.
    pub fields: Vec<String>,
    /// Kind compared first when sorting groups.
    pub primary: TagKind,
    /// Whether the primary comparison is reversed.
    pub reverse: bool,
}

impl FrbrParams {
    /// Parses a parameter string such as `title author year [sort=-date]`.
    pub fn parse(params: &str) -> Result<Self, FacetError> {
        let mut parsed = Self {
            fields: Vec::new(),
            primary: TagKind::Title,
            reverse: false,
        };

        for token in params.split(PARAM_SEPARATORS).filter(|t| !t.is_empty()) {
            if !token.starts_with('[') {
                parsed.fields.push(token.to_string());
                continue;
            }
            (parsed.primary, parsed.reverse) = match token {
                "[sort=title]" => (TagKind::Title, false),
                "[sort=author]" => (TagKind::Author, false),
                "[sort=date]" => (TagKind::Date, false),
                "[sort=-date]" => (TagKind::Date, true),
                "[sort=id]" => (TagKind::Identifier, false),
                _ => {
                    return Err(FacetError::UnknownDirective {
                        directive: token.to_string(),
                    });
                }
            };
        }

        Ok(parsed)
    }
}

/// FRBR groups computed for one result set.
#[derive(Debug)]
pub struct FrbrGroupData {
    /// Shared tag data.
    data: Arc<FrbrData>,
    /// Parsed parameters.
    params: FrbrParams,
    /// Group of each document, indexed by doc id.
    doc_groups: Vec<Option<GroupId>>,
    /// Representative (first collected) document of each group.
    group_docs: Vec<DocId>,
    /// Documents in each group; the root holds the whole result set.
    group_counts: Vec<u32>,
    /// Best score in each group.
    group_scores: Vec<f32>,
}

/// Accumulates the result set before clustering.
#[derive(Debug)]
pub struct FrbrCollector {
    /// Shared tag data.
    data: Arc<FrbrData>,
    /// Parsed parameters.
    params: FrbrParams,
    /// Collected documents, strictly ascending.
    docs: Vec<DocId>,
    /// Score of each collected document.
    scores: Vec<f32>,
}

impl FrbrGroupData {
    /// Parses `params` and loads (or reuses) the tag data for its fields.
    pub fn init(source: &dyn TermSource, params: &str) -> Result<FrbrCollector, FacetError> {
        let params = FrbrParams::parse(params)?;
        let data = FrbrData::cached(source, &params.fields)?;
        Ok(FrbrCollector {
            data,
            params,
            docs: Vec::new(),
            scores: Vec::new(),
        })
    }

    /// Group a document was placed in, if it was collected.
    pub fn doc_group(&self, doc: DocId) -> Option<GroupId> {
        self.doc_groups.get(doc as usize).copied().flatten()
    }

    /// Compares two documents on one kind of tag. Documents without such a
    /// tag sort after those with one, in either direction.
    fn compare_kind(&self, kind: TagKind, a: DocId, b: DocId, reverse: bool) -> Ordering {
        match (self.data.first_tag_of(a, kind), self.data.first_tag_of(b, kind)) {
            (Some(x), Some(y)) if reverse => y.cmp(&x),
            (Some(x), Some(y)) => x.cmp(&y),
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
        }
    }
}

impl FrbrCollector {
    /// Adds a matching document. Documents must arrive in strictly
    /// ascending order.
    pub fn collect(&mut self, doc: DocId, score: f32) -> Result<(), FacetError> {
        if let Some(&previous) = self.docs.last()
            && previous >= doc
        {
            return Err(FacetError::DocsOutOfOrder { previous, doc });
        }
        self.docs.push(doc);
        self.scores.push(score);
        Ok(())
    }

    /// Number of documents collected so far.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// True if nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Clusters the collected documents.
    pub fn finish(self) -> FrbrGroupData {
        debug!(docs = self.docs.len(), "building FRBR groups");

        let mut clusterer = Clusterer {
            data: &self.data,
            docs: &self.docs,
            doc_groups: vec![None; self.docs.last().map_or(0, |&d| d as usize + 1)],
            n_groups: 1,
        };
        for &doc in &self.docs {
            if clusterer.doc_groups[doc as usize].is_none() {
                clusterer.seed_group(doc);
            }
        }
        let Clusterer {
            doc_groups,
            n_groups,
            ..
        } = clusterer;

        let n_groups = n_groups as usize;
        let mut group_docs: Vec<Option<DocId>> = vec![None; n_groups];
        let mut group_counts = vec![0u32; n_groups];
        let mut group_scores = vec![0f32; n_groups];
        for (&doc, &score) in self.docs.iter().zip(&self.scores) {
            let Some(group) = doc_groups[doc as usize] else {
                continue;
            };
            let group = group as usize;
            group_docs[group].get_or_insert(doc);
            group_counts[group] += 1;
            group_scores[group] = group_scores[group].max(score);
            group_scores[ROOT as usize] = group_scores[ROOT as usize].max(score);
        }
        group_counts[ROOT as usize] = self.docs.len() as u32;

        debug!(docs = self.docs.len(), groups = n_groups - 1, "built FRBR groups");

        FrbrGroupData {
            data: self.data,
            params: self.params,
            doc_groups,
            group_docs: group_docs.into_iter().map(Option::unwrap_or_default).collect(),
            group_counts,
            group_scores,
        }
    }
}

/// Working state of one clustering run.
struct Clusterer<'a> {
    /// Shared tag data.
    data: &'a FrbrData,
    /// The result set, ascending.
    docs: &'a [DocId],
    /// Group assigned to each document so far.
    doc_groups: Vec<Option<GroupId>>,
    /// Next group id to hand out.
    n_groups: GroupId,
}

impl Clusterer<'_> {
    /// Starts a new group at `main_doc` and pulls in everything matching it.
    fn seed_group(&mut self, main_doc: DocId) {
        let group = self.n_groups;
        self.n_groups += 1;
        self.doc_groups[main_doc as usize] = Some(group);

        let data = self.data;
        for &main_title in data.doc_tags_of(main_doc, TagKind::Title) {
            let mut comp = Some(main_title);
            while let Some(title) = comp
                && self.absorb_title(main_doc, main_title, title, group)
            {
                comp = data.tags().next(title);
            }

            comp = data.tags().prev(main_title);
            while let Some(title) = comp
                && self.absorb_title(main_doc, main_title, title, group)
            {
                comp = data.tags().prev(title);
            }
        }
        trace!(doc = main_doc, group, "seeded FRBR group");
    }

    /// Absorbs result documents carrying `comp_title` that match `main_doc`.
    /// Returns false once the titles are too far apart to keep scanning.
    fn absorb_title(
        &mut self,
        main_doc: DocId,
        main_title: TagId,
        comp_title: TagId,
        group: GroupId,
    ) -> bool {
        if score_exact(&[main_title], &[comp_title], 100) < TITLE_SCAN_THRESHOLD {
            return false;
        }

        for &comp_doc in self.data.tag_docs(comp_title) {
            if comp_doc == main_doc
                || self.docs.binary_search(&comp_doc).is_err()
                || self.doc_groups[comp_doc as usize].is_some()
            {
                continue;
            }
            if self.match_score(main_doc, comp_doc) >= MATCH_THRESHOLD {
                self.doc_groups[comp_doc as usize] = Some(group);
            }
        }
        true
    }

    /// Summed field score of two documents.
    fn match_score(&self, a: DocId, b: DocId) -> u32 {
        TagKind::ALL
            .iter()
            .map(|&kind| {
                let hit = if kind == TagKind::Date { 50 } else { 100 };
                score_exact(
                    self.data.doc_tags_of(a, kind),
                    self.data.doc_tags_of(b, kind),
                    hit,
                )
            })
            .sum()
    }
}

/// `hit` if the sorted tag lists share a tag, else 0.
fn score_exact(a: &[TagId], b: &[TagId], hit: u32) -> u32 {
    if a.iter().any(|tag| b.binary_search(tag).is_ok()) {
        hit
    } else {
        0
    }
}

impl GroupData for FrbrGroupData {
    fn field(&self) -> &str {
        FRBR_FIELD
    }

    fn n_groups(&self) -> usize {
        self.group_counts.len()
    }

    fn name(&self, group: GroupId) -> Cow<'_, str> {
        if group == ROOT {
            return Cow::Borrowed("");
        }
        Cow::Owned(format!("{GROUP_PREFIX}{group}"))
    }

    fn parent(&self, group: GroupId) -> Option<GroupId> {
        (group != ROOT).then_some(ROOT)
    }

    fn child(&self, group: GroupId) -> Option<GroupId> {
        (group == ROOT && self.n_groups() > 1).then_some(1)
    }

    fn sibling(&self, group: GroupId) -> Option<GroupId> {
        let next = group + 1;
        (group != ROOT && (next as usize) < self.n_groups()).then_some(next)
    }

    fn n_children(&self, group: GroupId) -> usize {
        if group == ROOT {
            self.n_groups() - 1
        } else {
            0
        }
    }

    fn first_link(&self, doc: DocId) -> Option<LinkId> {
        self.doc_group(doc)
    }

    fn next_link(&self, _link: LinkId) -> Option<LinkId> {
        None
    }

    fn link_group(&self, link: LinkId) -> GroupId {
        link
    }

    fn find_group(&self, name: &str) -> Option<GroupId> {
        let group: GroupId = name.strip_prefix(GROUP_PREFIX)?.parse().ok()?;
        (group != ROOT && (group as usize) < self.n_groups()).then_some(group)
    }

    fn is_dynamic(&self) -> bool {
        true
    }

    fn n_doc_hits(&self, group: GroupId) -> u32 {
        self.group_counts[group as usize]
    }

    fn score(&self, group: GroupId) -> f32 {
        self.group_scores[group as usize]
    }

    fn compare(&self, a: GroupId, b: GroupId) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let (doc_a, doc_b) = (self.group_docs[a as usize], self.group_docs[b as usize]);

        let primary = self.params.primary;
        let ordering = self.compare_kind(primary, doc_a, doc_b, self.params.reverse);
        TagKind::ALL
            .iter()
            .filter(|&&kind| kind != primary)
            .fold(ordering, |ordering, &kind| {
                ordering.then_with(|| self.compare_kind(kind, doc_a, doc_b, false))
            })
    }
}
