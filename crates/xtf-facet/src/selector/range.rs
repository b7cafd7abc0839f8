//! Rank windows over each parent's children.

use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use xtf_select::RankRange;

use super::{GroupContext, GroupSelector, Next};
use crate::GroupId;

/// `[2-5]`: forwards only groups whose rank under their parent falls in a
/// 1-based inclusive range. Ranks count included groups in display order.
#[derive(Debug, Clone)]
pub struct RangeSelector {
    /// Accepted ranks.
    range: RankRange,
    /// Forward everything during the conservative pass.
    conservative: bool,
    /// Parents whose children have been ranked this pass.
    ranked_parents: HashSet<GroupId>,
    /// Rank of each group under its parent.
    ranks: HashMap<GroupId, u32>,
}

impl RangeSelector {
    /// Creates a selector accepting ranks `range.first()..=range.last()`.
    pub fn new(range: RankRange) -> Self {
        Self {
            range,
            conservative: false,
            ranked_parents: HashSet::new(),
            ranks: HashMap::new(),
        }
    }

    /// Rank of `group` under its parent, or `None` if it is not included.
    fn rank(&mut self, ctx: &dyn GroupContext, group: GroupId) -> Option<u32> {
        let Some(parent) = ctx.parent(group) else {
            return Some(1);
        };
        if self.ranked_parents.insert(parent) {
            for (i, kid) in ctx.included_children(parent).into_iter().enumerate() {
                self.ranks.insert(kid, i as u32 + 1);
            }
        }
        self.ranks.get(&group).copied()
    }
}

impl GroupSelector for RangeSelector {
    fn reset(&mut self, _ctx: &dyn GroupContext, conservative: bool) {
        self.conservative = conservative;
        self.ranked_parents.clear();
        self.ranks.clear();
    }

    fn process(&mut self, ctx: &mut dyn GroupContext, group: GroupId, next: &mut Next<'_>) {
        if self.conservative {
            next.process(ctx, group);
            return;
        }
        if let Some(rank) = self.rank(ctx, group)
            && self.range.contains(rank)
        {
            next.process(ctx, group);
        }
    }

    fn clone_box(&self) -> Box<dyn GroupSelector> {
        Box::new(self.clone())
    }
}

impl fmt::Display for RangeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::{ChildSelector, MarkSelector, RootSelector, SelectorChain, testing::Tree};

    fn tree() -> Tree {
        Tree::new(&[
            ("", None, 9),
            ("a", Some(0), 1),
            ("b", Some(0), 0),
            ("c", Some(0), 3),
            ("d", Some(0), 2),
            ("e", Some(0), 3),
        ])
    }

    fn chain(first: u32, last: u32) -> SelectorChain {
        SelectorChain::new(vec![
            Box::new(RootSelector),
            Box::new(ChildSelector),
            Box::new(RangeSelector::new(RankRange::new(first, last).unwrap())),
            Box::new(MarkSelector),
        ])
    }

    #[test]
    fn ranks_count_included_groups_only() {
        let mut ctx = tree();
        chain(2, 3).run(&mut ctx, false);
        // Included order is a, c, d, e; b is empty.
        assert_eq!(ctx.selected, vec![3, 4]);
    }

    #[test]
    fn single_rank() {
        let mut ctx = tree();
        chain(1, 1).run(&mut ctx, false);
        assert_eq!(ctx.selected, vec![1]);
    }

    #[test]
    fn range_past_the_end() {
        let mut ctx = tree();
        chain(4, 10).run(&mut ctx, false);
        assert_eq!(ctx.selected, vec![5]);
    }

    #[test]
    fn conservative_pass_forwards_everything() {
        let mut ctx = tree();
        chain(1, 1).run(&mut ctx, true);
        assert_eq!(ctx.selected, vec![1, 3, 4, 5]);
    }

    #[test]
    fn display() {
        let range = RangeSelector::new(RankRange::new(2, 5).unwrap());
        assert_eq!(range.to_string(), "[2-5]");
    }
}
