//! Per-group document hits.
//!
//! Hits are opaque to the grouping core beyond their ordering: a caller
//! supplies a [`DocHitMaker`] for each matching document, and the core only
//! decides which groups' [`HitQueue`]s it goes into.

use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
};

use serde::Serialize;

use crate::DocId;

/// Document window size that stands for "every matching document".
pub const UNLIMITED_DOCS: u32 = 999_999_999;

/// Keeps the greatest `limit` hits inserted so far.
#[derive(Debug, Clone)]
pub struct HitQueue<H> {
    /// Min-heap of retained hits, worst on top.
    heap: BinaryHeap<Reverse<H>>,
    /// Capacity.
    limit: usize,
}

impl<H: Ord> HitQueue<H> {
    /// Creates a queue retaining at most `limit` hits. No space is reserved
    /// up front, so a huge limit costs nothing until hits arrive.
    pub fn new(limit: usize) -> Self {
        Self {
            heap: BinaryHeap::new(),
            limit,
        }
    }

    /// Capacity of the queue.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Raises the capacity by one.
    pub fn grow(&mut self) {
        self.limit += 1;
    }

    /// Number of retained hits.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// True if no hits are retained.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Offers a hit. Returns true if it was retained.
    pub fn insert(&mut self, hit: H) -> bool {
        if self.heap.len() < self.limit {
            self.heap.push(Reverse(hit));
            return true;
        }
        match self.heap.peek() {
            Some(Reverse(worst)) if hit > *worst => {
                self.heap.pop();
                self.heap.push(Reverse(hit));
                true
            }
            _ => false,
        }
    }

    /// Consumes the queue, returning hits best first.
    pub fn into_sorted_desc(self) -> Vec<H> {
        // Ascending order of `Reverse<H>` is descending order of `H`.
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(hit)| hit)
            .collect()
    }
}

/// Supplies one matching document to the grouping core.
pub trait DocHitMaker<H> {
    /// Index-wide id of the document.
    fn doc_num(&self) -> DocId;

    /// Relevance score of the document.
    fn score(&self) -> f32;

    /// Offers this document's hit to a group's queue.
    fn insert_into(&self, queue: &mut HitQueue<H>) -> bool;
}

/// A document and its score: the stock hit type.
///
/// Higher scores order greater; among equal scores the lower document id
/// orders greater, so it ranks first.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoredHit {
    /// Index-wide document id.
    pub doc: DocId,
    /// Relevance score.
    pub score: f32,
}

impl ScoredHit {
    /// Creates a hit.
    pub fn new(doc: DocId, score: f32) -> Self {
        Self { doc, score }
    }
}

impl PartialEq for ScoredHit {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScoredHit {}

impl PartialOrd for ScoredHit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredHit {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.doc.cmp(&self.doc))
    }
}

impl DocHitMaker<Self> for ScoredHit {
    fn doc_num(&self) -> DocId {
        self.doc
    }

    fn score(&self) -> f32 {
        self.score
    }

    fn insert_into(&self, queue: &mut HitQueue<Self>) -> bool {
        queue.insert(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(hits: &[ScoredHit]) -> Vec<DocId> {
        hits.iter().map(|h| h.doc).collect()
    }

    #[test]
    fn keeps_best_hits() {
        let mut queue = HitQueue::new(2);
        for (doc, score) in [(0, 0.5), (1, 2.0), (2, 1.0), (3, 3.0), (4, 0.1)] {
            queue.insert(ScoredHit::new(doc, score));
        }
        assert_eq!(queue.len(), 2);
        assert_eq!(docs(&queue.into_sorted_desc()), vec![3, 1]);
    }

    #[test]
    fn rejects_worse_hit_when_full() {
        let mut queue = HitQueue::new(1);
        assert!(queue.insert(ScoredHit::new(0, 1.0)));
        assert!(!queue.insert(ScoredHit::new(1, 0.5)));
        // Equal score: the lower doc id is better, so doc 2 loses.
        assert!(!queue.insert(ScoredHit::new(2, 1.0)));
        assert!(queue.insert(ScoredHit::new(3, 1.5)));
        assert_eq!(docs(&queue.into_sorted_desc()), vec![3]);
    }

    #[test]
    fn zero_limit_retains_nothing() {
        let mut queue = HitQueue::new(0);
        assert!(!queue.insert(ScoredHit::new(0, 1.0)));
        assert!(queue.is_empty());
    }

    #[test]
    fn growing_before_each_insert_keeps_everything() {
        let mut queue = HitQueue::new(0);
        for doc in 0..100 {
            queue.grow();
            queue.insert(ScoredHit::new(doc, (doc % 7) as f32));
        }
        assert_eq!(queue.len(), 100);
        assert_eq!(queue.limit(), 100);

        let hits = queue.into_sorted_desc();
        assert!(hits.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(hits[0].doc, 6);
    }

    #[test]
    fn ties_rank_lower_doc_first() {
        let mut queue = HitQueue::new(3);
        for doc in [5, 1, 3] {
            queue.insert(ScoredHit::new(doc, 1.0));
        }
        assert_eq!(docs(&queue.into_sorted_desc()), vec![1, 3, 5]);
    }
}
