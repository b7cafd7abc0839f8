//! Per-query group counting and result rendering.
//!
//! A [`GroupCounts`] lives for one facet of one query:
//!
//! 1. Construction runs the selector chain once in conservative mode to find
//!    out which groups need hit queues. Dynamic data already knows its
//!    counts, so it is sorted and selected for real straight away instead.
//! 2. [`GroupCounts::add_doc`] is called once per matching document.
//! 3. [`GroupCounts::into_result`] sorts the hierarchy, runs the real
//!    selection pass and builds the [`ResultFacet`] tree.

use std::{borrow::Cow, cmp::Ordering};

use serde::Serialize;
use tracing::{debug, trace};
use xtf_config::SortGroupsBy;

use crate::{
    GroupId,
    error::FacetError,
    facet::FacetSpec,
    group_data::{GroupData, ROOT},
    hit::{DocHitMaker, HitQueue, UNLIMITED_DOCS},
    selector::{GroupContext, SelectorChain},
};

/// Largest hierarchy that can be sorted by document count.
pub const MAX_SORTABLE_GROUPS: usize = 1 << 20;

/// Display state of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    /// Not displayed.
    #[default]
    None,
    /// Selected by the chain.
    Primary,
    /// Displayed because a descendant is selected.
    Ancestor,
}

/// One facet of a query result.
#[derive(Debug, Clone, Serialize)]
pub struct ResultFacet<H> {
    /// Field the facet was computed on.
    pub field: String,
    /// The root group and everything selected below it.
    pub root_group: ResultGroup<H>,
}

/// One displayed group.
#[derive(Debug, Clone, Serialize)]
pub struct ResultGroup<H> {
    /// Group name; empty for the root.
    pub value: String,
    /// Position among the parent's included children, from 0.
    pub rank: u32,
    /// Included children, displayed or not.
    pub total_sub_groups: u32,
    /// Displayed children, in display order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sub_groups: Vec<ResultGroup<H>>,
    /// Matching documents in the group.
    pub total_docs: u32,
    /// Rank of the first hit in `doc_hits`.
    pub start_doc: u32,
    /// One past the rank of the last hit in `doc_hits`.
    pub end_doc: u32,
    /// Hits ranked `start_doc..end_doc`, best first.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub doc_hits: Vec<H>,
}

/// Sorted child/sibling links, replacing the data's own order.
#[derive(Debug)]
struct SortedTree {
    /// First child of each group.
    child: Vec<Option<GroupId>>,
    /// Next sibling of each group.
    sibling: Vec<Option<GroupId>>,
}

/// Everything selectors can see and change.
struct CountState<'a> {
    /// The hierarchy being counted.
    data: &'a dyn GroupData,
    /// Sibling order.
    sort_groups_by: SortGroupsBy,
    /// Show empty groups.
    include_empty: bool,
    /// True during the conservative pass.
    prep_mode: bool,
    /// Documents per group. Unused for dynamic data.
    count: Vec<u32>,
    /// Best score per group. Unused for dynamic data.
    score: Vec<f32>,
    /// Last document stamp that reached each group.
    mark: Vec<u32>,
    /// Current document stamp.
    cur_mark: u32,
    /// Display state per group.
    selection: Vec<Selection>,
    /// First hit rank to keep per group.
    start_doc: Vec<u32>,
    /// Hits to keep per group; 0 for none.
    max_docs: Vec<u32>,
    /// Display order, once sorted.
    sorted: Option<SortedTree>,
}

impl CountState<'_> {
    /// Documents in a group.
    fn doc_count(&self, group: GroupId) -> u32 {
        if self.data.is_dynamic() {
            self.data.n_doc_hits(group)
        } else {
            self.count[group as usize]
        }
    }

    /// Best score in a group.
    fn best_score(&self, group: GroupId) -> f32 {
        if self.data.is_dynamic() {
            self.data.score(group)
        } else {
            self.score[group as usize]
        }
    }

    /// Sibling order of two groups under the configured sort.
    fn compare(&self, a: GroupId, b: GroupId) -> Ordering {
        let by_value = || self.data.compare(a, b);
        let by_score = || self.best_score(b).total_cmp(&self.best_score(a));
        let by_count = || self.doc_count(b).cmp(&self.doc_count(a));

        match self.sort_groups_by {
            SortGroupsBy::Value => by_value().then_with(by_score).then_with(by_count),
            SortGroupsBy::ReverseValue => {
                by_value().reverse().then_with(by_score).then_with(by_count)
            }
            SortGroupsBy::TotalDocs => by_count().then_with(by_value).then_with(by_score),
            SortGroupsBy::MaxDocScore => by_score().then_with(by_value).then_with(by_count),
        }
    }

    /// Computes the display order of every parent's children.
    fn sort_groups(&mut self) -> Result<(), FacetError> {
        let n_groups = self.data.n_groups();
        if !self.data.is_dynamic() && self.sort_groups_by == SortGroupsBy::Value {
            // Static groups are numbered in value order already.
            self.sorted = None;
            return Ok(());
        }
        if self.sort_groups_by == SortGroupsBy::TotalDocs && n_groups > MAX_SORTABLE_GROUPS {
            return Err(FacetError::TooManyGroups {
                count: n_groups,
                limit: MAX_SORTABLE_GROUPS,
            });
        }

        let mut sorted = SortedTree {
            child: vec![None; n_groups],
            sibling: vec![None; n_groups],
        };
        let mut pending = vec![ROOT];
        while let Some(parent) = pending.pop() {
            let mut kids: Vec<GroupId> = self.data.children(parent).collect();
            if kids.is_empty() {
                continue;
            }
            kids.sort_by(|&a, &b| self.compare(a, b));

            sorted.child[parent as usize] = kids.first().copied();
            for pair in kids.windows(2) {
                sorted.sibling[pair[0] as usize] = Some(pair[1]);
            }
            pending.extend(kids);
        }

        trace!(field = self.data.field(), sort = %self.sort_groups_by, "sorted groups");
        self.sorted = Some(sorted);
        Ok(())
    }
}

impl GroupContext for CountState<'_> {
    fn n_groups(&self) -> usize {
        self.data.n_groups()
    }

    fn parent(&self, group: GroupId) -> Option<GroupId> {
        self.data.parent(group)
    }

    fn child(&self, group: GroupId) -> Option<GroupId> {
        match &self.sorted {
            Some(sorted) => sorted.child[group as usize],
            None => self.data.child(group),
        }
    }

    fn sibling(&self, group: GroupId) -> Option<GroupId> {
        match &self.sorted {
            Some(sorted) => sorted.sibling[group as usize],
            None => self.data.sibling(group),
        }
    }

    fn name(&self, group: GroupId) -> Cow<'_, str> {
        self.data.name(group)
    }

    fn should_include(&self, group: GroupId) -> bool {
        if self.include_empty {
            return true;
        }
        if self.data.is_dynamic() {
            return self.data.n_doc_hits(group) > 0;
        }
        self.prep_mode || self.count[group as usize] > 0
    }

    fn n_doc_hits(&self, group: GroupId) -> u32 {
        self.doc_count(group)
    }

    fn is_selected(&self, group: GroupId) -> bool {
        self.selection[group as usize] == Selection::Primary
    }

    fn select_group(&mut self, group: GroupId) {
        if self.prep_mode {
            return;
        }
        self.selection[group as usize] = Selection::Primary;
        let mut ancestor = self.data.parent(group);
        while let Some(g) = ancestor {
            let selection = &mut self.selection[g as usize];
            if *selection != Selection::None {
                break;
            }
            *selection = Selection::Ancestor;
            ancestor = self.data.parent(g);
        }
    }

    fn gather_docs(&mut self, group: GroupId, start: u32, max: u32) {
        self.start_doc[group as usize] = start;
        self.max_docs[group as usize] = max;
    }
}

/// Counts one facet's groups over a stream of matching documents.
pub struct GroupCounts<'a, H> {
    /// Counters and selection state.
    state: CountState<'a>,
    /// This query's copy of the facet's selector chain.
    chain: SelectorChain,
    /// Hit queue per group, created on first hit.
    queues: Vec<Option<HitQueue<H>>>,
}

impl<'a, H: Ord> GroupCounts<'a, H> {
    /// Prepares to count `data` under `spec`.
    pub fn new(data: &'a dyn GroupData, spec: &FacetSpec) -> Result<Self, FacetError> {
        let n_groups = data.n_groups();
        let per_group = if data.is_dynamic() { 0 } else { n_groups };
        let mut counts = Self {
            state: CountState {
                data,
                sort_groups_by: spec.sort_groups_by,
                include_empty: spec.include_empty_groups,
                prep_mode: false,
                count: vec![0; per_group],
                score: vec![0.0; per_group],
                mark: vec![0; n_groups],
                cur_mark: 0,
                selection: vec![Selection::None; n_groups],
                start_doc: vec![0; n_groups],
                max_docs: vec![0; n_groups],
                sorted: None,
            },
            chain: spec.selector.clone(),
            queues: (0..n_groups).map(|_| None).collect(),
        };

        if data.is_dynamic() {
            counts.sort_and_select()?;
        } else {
            counts.conservative_prep();
        }
        debug!(field = data.field(), groups = n_groups, chain = %counts.chain, "prepared group counts");
        Ok(counts)
    }

    /// Runs the chain in conservative mode to provision hit windows.
    fn conservative_prep(&mut self) {
        self.state.prep_mode = true;
        self.chain.run(&mut self.state, true);
        self.state.prep_mode = false;
    }

    /// Sorts the hierarchy and runs the real selection pass.
    fn sort_and_select(&mut self) -> Result<(), FacetError> {
        self.state.start_doc.fill(0);
        self.state.max_docs.fill(0);
        self.state.sort_groups()?;
        self.chain.run(&mut self.state, false);
        Ok(())
    }

    /// Counts one matching document in every group it belongs to, and
    /// offers it to the hit queue of each such group that wants hits.
    pub fn add_doc<M>(&mut self, hit: &M)
    where
        M: DocHitMaker<H> + ?Sized,
    {
        let state = &mut self.state;
        state.cur_mark += 1;
        let data = state.data;
        let score = hit.score();

        for linked in data.links(hit.doc_num()) {
            for group in data.ancestors_and_self(linked) {
                let g = group as usize;
                // Everything above was reached through an earlier link.
                if state.mark[g] == state.cur_mark {
                    break;
                }
                state.mark[g] = state.cur_mark;
                if !data.is_dynamic() {
                    state.count[g] += 1;
                    state.score[g] = state.score[g].max(score);
                }

                let max = state.max_docs[g];
                if max == 0 {
                    continue;
                }
                let unlimited = max >= UNLIMITED_DOCS;
                let start = state.start_doc[g] as usize;
                let queue = self.queues[g].get_or_insert_with(|| {
                    HitQueue::new(if unlimited { start } else { start + max as usize })
                });
                if unlimited {
                    queue.grow();
                }
                hit.insert_into(queue);
            }
        }
    }

    /// Documents counted in a group so far.
    pub fn n_doc_hits(&self, group: GroupId) -> u32 {
        self.state.doc_count(group)
    }

    /// Best score counted in a group so far.
    pub fn score(&self, group: GroupId) -> f32 {
        self.state.best_score(group)
    }

    /// Display state of a group.
    pub fn selection(&self, group: GroupId) -> Selection {
        self.state.selection[group as usize]
    }

    /// Finishes counting and renders the facet.
    pub fn into_result(mut self) -> Result<ResultFacet<H>, FacetError> {
        if !self.state.data.is_dynamic() {
            self.sort_and_select()?;
        }
        let root_group = self.build_group(ROOT);
        Ok(ResultFacet {
            field: self.state.data.field().to_string(),
            root_group,
        })
    }

    /// Builds the result node for `group` and its displayed descendants.
    fn build_group(&mut self, group: GroupId) -> ResultGroup<H> {
        let value = if group == ROOT {
            String::new()
        } else {
            self.state.data.name(group).into_owned()
        };

        let kids = (&self.state as &dyn GroupContext).included_children(group);
        let displayed: Vec<(u32, GroupId)> = kids
            .iter()
            .enumerate()
            .filter(|&(_, &kid)| self.state.selection[kid as usize] != Selection::None)
            .map(|(rank, &kid)| (rank as u32, kid))
            .collect();

        let mut result = ResultGroup {
            value,
            rank: 0,
            total_sub_groups: kids.len() as u32,
            sub_groups: Vec::with_capacity(displayed.len()),
            total_docs: self.state.doc_count(group),
            start_doc: 0,
            end_doc: 0,
            doc_hits: Vec::new(),
        };
        for (rank, kid) in displayed {
            let mut sub_group = self.build_group(kid);
            sub_group.rank = rank;
            result.sub_groups.push(sub_group);
        }

        let g = group as usize;
        if self.state.max_docs[g] != 0
            && let Some(queue) = self.queues[g].take()
        {
            let start = self.state.start_doc[g];
            let max = self.state.max_docs[g];
            let found = queue.len() as u32;
            let n_hits = found.saturating_sub(start).min(max);
            result.start_doc = start;
            result.end_doc = start + n_hits;
            result.doc_hits = queue
                .into_sorted_desc()
                .into_iter()
                .skip(start as usize)
                .take(n_hits as usize)
                .collect();
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DocId, LinkId, frbr::FrbrGroupData, hit::ScoredHit, memory::MemoryIndex,
        static_data::StaticGroupData,
    };

    /// The five-document subject collection.
    fn subjects() -> StaticGroupData {
        let mut index = MemoryIndex::new();
        index
            .add(0, "subject", "Fiction::Mystery")
            .add(1, "subject", "Fiction::Mystery")
            .add(2, "subject", "Fiction")
            .add(3, "subject", "Nonfiction")
            .add(4, "subject", "Nonfiction");
        StaticGroupData::build(&index, "subject").unwrap()
    }

    fn spec(select: &str) -> FacetSpec {
        FacetSpec::new("subject").with_select(select).unwrap()
    }

    fn hits(scores: &[f32]) -> Vec<ScoredHit> {
        scores
            .iter()
            .enumerate()
            .map(|(doc, &score)| ScoredHit::new(doc as u32, score))
            .collect()
    }

    fn count(data: &dyn GroupData, spec: &FacetSpec, hits: &[ScoredHit]) -> ResultFacet<ScoredHit> {
        let mut counts = GroupCounts::new(data, spec).unwrap();
        for hit in hits {
            counts.add_doc(hit);
        }
        counts.into_result().unwrap()
    }

    fn values(group: &ResultGroup<ScoredHit>) -> Vec<&str> {
        group.sub_groups.iter().map(|g| g.value.as_str()).collect()
    }

    /// A root with `n_groups - 1` document-less children.
    struct FlatGroups {
        /// Groups including the root.
        n_groups: usize,
    }

    impl GroupData for FlatGroups {
        fn field(&self) -> &str {
            "flat"
        }

        fn n_groups(&self) -> usize {
            self.n_groups
        }

        fn name(&self, group: GroupId) -> Cow<'_, str> {
            Cow::Owned(group.to_string())
        }

        fn parent(&self, group: GroupId) -> Option<GroupId> {
            (group != ROOT).then_some(ROOT)
        }

        fn child(&self, group: GroupId) -> Option<GroupId> {
            (group == ROOT && self.n_groups > 1).then_some(1)
        }

        fn sibling(&self, group: GroupId) -> Option<GroupId> {
            let next = group + 1;
            (group != ROOT && (next as usize) < self.n_groups).then_some(next)
        }

        fn first_link(&self, _doc: DocId) -> Option<LinkId> {
            None
        }

        fn next_link(&self, _link: LinkId) -> Option<LinkId> {
            None
        }

        fn link_group(&self, link: LinkId) -> GroupId {
            link
        }

        fn find_group(&self, name: &str) -> Option<GroupId> {
            name.parse().ok()
        }

        fn is_dynamic(&self) -> bool {
            false
        }
    }

    fn flat_result(
        n_groups: usize,
        sort: SortGroupsBy,
    ) -> Result<ResultFacet<ScoredHit>, FacetError> {
        let data = FlatGroups { n_groups };
        let spec = spec("*").with_sort(sort);
        GroupCounts::new(&data, &spec)?.into_result()
    }

    #[test]
    fn count_sort_group_limit() {
        let facet = flat_result(MAX_SORTABLE_GROUPS, SortGroupsBy::TotalDocs).unwrap();
        assert_eq!(facet.root_group.total_docs, 0);

        let err = flat_result(MAX_SORTABLE_GROUPS + 1, SortGroupsBy::TotalDocs).unwrap_err();
        assert!(matches!(
            err,
            FacetError::TooManyGroups { count, limit }
                if count == MAX_SORTABLE_GROUPS + 1 && limit == MAX_SORTABLE_GROUPS
        ));
    }

    #[test]
    fn value_sort_has_no_group_limit() {
        assert!(flat_result(MAX_SORTABLE_GROUPS + 1, SortGroupsBy::Value).is_ok());
    }

    #[test]
    fn counts_include_descendants() {
        let data = subjects();
        let spec = spec("**");
        let mut counts: GroupCounts<'_, ScoredHit> = GroupCounts::new(&data, &spec).unwrap();
        for hit in hits(&[1.0, 2.0, 3.0, 4.0, 5.0]) {
            counts.add_doc(&hit);
        }

        let fiction = data.find_group("Fiction").unwrap();
        let mystery = data.find_group("Fiction::Mystery").unwrap();
        let nonfiction = data.find_group("Nonfiction").unwrap();
        assert_eq!(data.n_groups(), 4);
        assert_eq!(counts.n_doc_hits(mystery), 2);
        assert_eq!(counts.n_doc_hits(fiction), 3);
        assert_eq!(counts.n_doc_hits(nonfiction), 2);
        assert_eq!(counts.n_doc_hits(ROOT), 5);
        assert_eq!(counts.score(fiction), 3.0);
        assert_eq!(counts.score(ROOT), 5.0);
    }

    #[test]
    fn multiple_links_count_ancestors_once() {
        let mut index = MemoryIndex::new();
        index
            .add(0, "subject", "Arts::Music")
            .add(0, "subject", "Arts::Painting")
            .add(0, "subject", "Arts")
            .add(1, "subject", "Arts::Music");
        let data = StaticGroupData::build(&index, "subject").unwrap();
        let spec = spec("");
        let mut counts: GroupCounts<'_, ScoredHit> = GroupCounts::new(&data, &spec).unwrap();
        for hit in hits(&[1.0, 1.0]) {
            counts.add_doc(&hit);
        }
        assert_eq!(counts.n_doc_hits(data.find_group("Arts").unwrap()), 2);
        assert_eq!(counts.n_doc_hits(data.find_group("Arts::Music").unwrap()), 2);
        assert_eq!(counts.n_doc_hits(data.find_group("Arts::Painting").unwrap()), 1);
        assert_eq!(counts.n_doc_hits(ROOT), 2);
    }

    #[test]
    fn result_tree_ranks_and_totals() {
        let data = subjects();
        let result = count(&data, &spec("*"), &hits(&[1.0; 5]));

        assert_eq!(result.field, "subject");
        let root = &result.root_group;
        assert_eq!(root.value, "");
        assert_eq!(root.total_docs, 5);
        assert_eq!(root.total_sub_groups, 2);
        // totalDocs order: Fiction (3) before Nonfiction (2).
        assert_eq!(values(root), vec!["Fiction", "Nonfiction"]);
        assert_eq!(root.sub_groups[0].rank, 0);
        assert_eq!(root.sub_groups[1].rank, 1);
        assert_eq!(root.sub_groups[0].total_docs, 3);
        // Mystery is counted under Fiction but not displayed.
        assert_eq!(root.sub_groups[0].total_sub_groups, 1);
        assert!(root.sub_groups[0].sub_groups.is_empty());
    }

    #[test]
    fn ancestors_of_selection_are_displayed() {
        let data = subjects();
        let result = count(&data, &spec("Fiction::Mystery"), &hits(&[1.0; 5]));
        let root = &result.root_group;
        assert_eq!(values(root), vec!["Fiction"]);
        assert_eq!(values(&root.sub_groups[0]), vec!["Mystery"]);
        assert_eq!(root.sub_groups[0].sub_groups[0].total_docs, 2);
    }

    #[test]
    fn empty_groups_hidden_unless_requested() {
        let data = subjects();
        // Only the two Mystery documents match.
        let matched = [ScoredHit::new(0, 1.0), ScoredHit::new(1, 1.0)];

        let result = count(&data, &spec("*"), &matched);
        assert_eq!(values(&result.root_group), vec!["Fiction"]);
        assert_eq!(result.root_group.total_sub_groups, 1);

        let spec = spec("*").with_empty_groups(true);
        let result = count(&data, &spec, &matched);
        assert_eq!(values(&result.root_group), vec!["Fiction", "Nonfiction"]);
        assert_eq!(result.root_group.sub_groups[1].total_docs, 0);
    }

    /// Five documents in one group.
    fn flat() -> StaticGroupData {
        let mut index = MemoryIndex::new();
        for doc in 0..5 {
            index.add(doc, "subject", "All");
        }
        StaticGroupData::build(&index, "subject").unwrap()
    }

    fn docs(group: &ResultGroup<ScoredHit>) -> Vec<u32> {
        group.doc_hits.iter().map(|h| h.doc).collect()
    }

    #[test]
    fn bounded_hits_keep_the_best() {
        let data = flat();
        let scores = [0.5, 4.0, 1.0, 3.0, 2.0];
        let result = count(&data, &spec("*#1-2"), &hits(&scores));
        let all = &result.root_group.sub_groups[0];
        assert_eq!((all.start_doc, all.end_doc), (0, 2));
        assert_eq!(docs(all), vec![1, 3]);
    }

    #[test]
    fn hit_window_offset() {
        let data = flat();
        let scores = [0.5, 4.0, 1.0, 3.0, 2.0];
        let result = count(&data, &spec("*#2-3"), &hits(&scores));
        let all = &result.root_group.sub_groups[0];
        assert_eq!((all.start_doc, all.end_doc), (1, 3));
        assert_eq!(docs(all), vec![3, 4]);

        // A window past the last hit is empty.
        let result = count(&data, &spec("*#9-10"), &hits(&scores));
        let all = &result.root_group.sub_groups[0];
        assert_eq!((all.start_doc, all.end_doc), (8, 8));
        assert!(all.doc_hits.is_empty());
    }

    #[test]
    fn equal_scores_rank_by_document() {
        let data = flat();
        let result = count(&data, &spec("*#all"), &hits(&[1.0; 5]));
        assert_eq!(docs(&result.root_group.sub_groups[0]), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn all_window_returns_every_hit() {
        let data = subjects();
        let result = count(&data, &spec("*#all"), &hits(&[5.0, 4.0, 3.0, 2.0, 1.0]));
        let fiction = &result.root_group.sub_groups[0];
        assert_eq!(fiction.value, "Fiction");
        assert_eq!((fiction.start_doc, fiction.end_doc), (0, 3));
        assert_eq!(docs(fiction), vec![0, 1, 2]);
        // Hits are gathered only where the chain asked for them.
        assert!(result.root_group.doc_hits.is_empty());
    }

    #[test]
    fn total_docs_order_breaks_ties_by_value() {
        let mut index = MemoryIndex::new();
        index
            .add(0, "subject", "Delta")
            .add(1, "subject", "Beta")
            .add(2, "subject", "Alpha")
            .add(3, "subject", "Charlie")
            .add(4, "subject", "Charlie");
        let data = StaticGroupData::build(&index, "subject").unwrap();
        let result = count(&data, &spec("*"), &hits(&[1.0; 5]));
        assert_eq!(
            values(&result.root_group),
            vec!["Charlie", "Alpha", "Beta", "Delta"]
        );
        let totals: Vec<u32> = result.root_group.sub_groups.iter().map(|g| g.total_docs).collect();
        assert!(totals.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn value_orders() {
        let data = subjects();
        let by_value = spec("*").with_sort(SortGroupsBy::Value);
        let result = count(&data, &by_value, &hits(&[1.0; 5]));
        assert_eq!(values(&result.root_group), vec!["Fiction", "Nonfiction"]);

        let reverse = spec("*").with_sort(SortGroupsBy::ReverseValue);
        let result = count(&data, &reverse, &hits(&[1.0; 5]));
        assert_eq!(values(&result.root_group), vec!["Nonfiction", "Fiction"]);
    }

    #[test]
    fn max_doc_score_order() {
        let data = subjects();
        let by_score = spec("*").with_sort(SortGroupsBy::MaxDocScore);
        let result = count(&data, &by_score, &hits(&[1.0, 1.0, 1.0, 9.0, 1.0]));
        assert_eq!(values(&result.root_group), vec!["Nonfiction", "Fiction"]);
    }

    #[test]
    fn rank_window_uses_sorted_order() {
        let data = subjects();
        let result = count(&data, &spec("*[2]"), &hits(&[1.0; 5]));
        assert_eq!(values(&result.root_group), vec!["Nonfiction"]);
        assert_eq!(result.root_group.sub_groups[0].rank, 1);
    }

    #[test]
    fn top_choices_end_to_end() {
        let data = subjects();
        let result = count(&data, &spec("**[topChoices]"), &hits(&[1.0; 5]));
        assert_eq!(values(&result.root_group), vec!["Fiction", "Nonfiction"]);
        for group in &result.root_group.sub_groups {
            assert!(group.sub_groups.is_empty());
        }
    }

    #[test]
    fn union_of_paths() {
        let data = subjects();
        let result = count(
            &data,
            &spec("Nonfiction#all | Fiction::Mystery"),
            &hits(&[1.0, 2.0, 3.0, 4.0, 5.0]),
        );
        let root = &result.root_group;
        assert_eq!(values(root), vec!["Fiction", "Nonfiction"]);
        assert_eq!(root.sub_groups[1].doc_hits.len(), 2);
        assert_eq!(values(&root.sub_groups[0]), vec!["Mystery"]);
    }

    #[test]
    fn dynamic_data_is_selected_up_front() {
        let mut index = MemoryIndex::new();
        index
            .add(0, "title", "Moby Dick")
            .add(0, "author", "Melville")
            .add(1, "title", "Moby Dick")
            .add(1, "author", "Melville")
            .add(2, "title", "Typee")
            .add(2, "author", "Melville");
        let mut collector = FrbrGroupData::init(&index, "title author").unwrap();
        for (doc, score) in [(0, 1.0), (1, 2.0), (2, 3.0)] {
            collector.collect(doc, score).unwrap();
        }
        let groups = collector.finish();

        let spec = FacetSpec::new("dynamic:frbr(title author)")
            .with_select("*#all")
            .unwrap();
        let mut counts: GroupCounts<'_, ScoredHit> = GroupCounts::new(&groups, &spec).unwrap();
        assert_eq!(counts.selection(1), Selection::Primary);
        assert_eq!(counts.selection(ROOT), Selection::Ancestor);

        for hit in [ScoredHit::new(0, 1.0), ScoredHit::new(1, 2.0), ScoredHit::new(2, 3.0)] {
            counts.add_doc(&hit);
        }
        let result = counts.into_result().unwrap();
        assert_eq!(result.field, "dynamicFRBR");
        let root = &result.root_group;
        assert_eq!(root.total_docs, 3);
        // Moby Dick has two records and sorts first by count.
        assert_eq!(values(root), vec!["group-1", "group-2"]);
        assert_eq!(root.sub_groups[0].total_docs, 2);
        assert_eq!(docs(&root.sub_groups[0]), vec![1, 0]);
    }

    #[test]
    fn serializes_to_json() {
        let data = subjects();
        let result = count(&data, &spec("*[1]#1"), &hits(&[1.0, 2.0, 3.0, 4.0, 5.0]));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["field"], "subject");
        assert_eq!(json["root_group"]["total_docs"], 5);
        let fiction = &json["root_group"]["sub_groups"][0];
        assert_eq!(fiction["value"], "Fiction");
        assert_eq!(fiction["doc_hits"][0]["doc"], 2);
        assert!(json["root_group"].get("doc_hits").is_none());
    }
}
