//! Alternation of independent selections.

use std::fmt;

use super::{GroupContext, GroupSelector, Next, SelectorChain};
use crate::{GroupId, group_data::ROOT};

/// `a | b`: runs each sub-chain to completion on the group it receives,
/// one after the other. Only meaningful at the head of a chain, fed the
/// root. Sub-chains end in their own terminal stage, so nothing is
/// forwarded past the union.
#[derive(Debug, Clone)]
pub struct UnionSelector {
    /// Alternatives, in source order.
    chains: Vec<SelectorChain>,
}

impl UnionSelector {
    /// Creates a union of `chains`.
    pub fn new(chains: Vec<SelectorChain>) -> Self {
        Self { chains }
    }
}

impl GroupSelector for UnionSelector {
    fn reset(&mut self, ctx: &dyn GroupContext, conservative: bool) {
        for chain in &mut self.chains {
            chain.reset(ctx, conservative);
        }
    }

    fn process(&mut self, ctx: &mut dyn GroupContext, group: GroupId, _next: &mut Next<'_>) {
        debug_assert_eq!(group, ROOT, "union must be fed the root group");
        for chain in &mut self.chains {
            chain.feed(ctx, group);
        }
    }

    fn flush(&mut self, _ctx: &mut dyn GroupContext, _next: &mut Next<'_>) {}

    fn clone_box(&self) -> Box<dyn GroupSelector> {
        Box::new(self.clone())
    }
}

impl fmt::Display for UnionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "union(")?;
        for (i, chain) in self.chains.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{chain}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::{
        MarkSelector, NameSelector, RootSelector, TopChoiceSelector, path::ChildSelector,
        testing::Tree,
    };

    fn tree() -> Tree {
        Tree::new(&[
            ("", None, 5),
            ("Fiction", Some(0), 3),
            ("Nonfiction", Some(0), 2),
            ("Mystery", Some(1), 2),
            ("Romance", Some(1), 1),
        ])
    }

    fn named(path: &[&str]) -> SelectorChain {
        let mut stages: Vec<Box<dyn GroupSelector>> = vec![Box::new(RootSelector)];
        stages.extend(
            path.iter()
                .map(|name| Box::new(NameSelector::new(*name)) as Box<dyn GroupSelector>),
        );
        stages.push(Box::new(MarkSelector));
        SelectorChain::new(stages)
    }

    #[test]
    fn runs_every_alternative() {
        let mut ctx = tree();
        let mut chain = SelectorChain::new(vec![Box::new(UnionSelector::new(vec![
            named(&["Fiction", "Romance"]),
            named(&["Nonfiction"]),
        ]))]);
        chain.run(&mut ctx, false);
        assert_eq!(ctx.selected, vec![4, 2]);
    }

    #[test]
    fn alternatives_flush_independently() {
        let mut ctx = tree();
        let top_choices = SelectorChain::new(vec![
            Box::new(RootSelector),
            Box::new(NameSelector::new("Fiction")),
            Box::new(ChildSelector),
            Box::new(TopChoiceSelector::default()),
            Box::new(MarkSelector),
        ]);
        let mut chain = SelectorChain::new(vec![Box::new(UnionSelector::new(vec![
            top_choices,
            named(&["Nonfiction"]),
        ]))]);
        chain.run(&mut ctx, false);
        // The top choices are emitted when the first alternative flushes,
        // before the second alternative runs.
        assert_eq!(ctx.selected, vec![3, 4, 2]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "union must be fed the root group")]
    fn rejects_non_root_input() {
        let mut ctx = tree();
        let union = UnionSelector::new(vec![named(&["Mystery"])]);
        let mut chain = SelectorChain::new(vec![Box::new(ChildSelector), Box::new(union)]);
        chain.run(&mut ctx, false);
    }

    #[test]
    fn display() {
        let union = UnionSelector::new(vec![named(&["Fiction"]), named(&["Nonfiction"])]);
        assert_eq!(
            union.to_string(),
            "union(root -> \"Fiction\" -> mark | root -> \"Nonfiction\" -> mark)"
        );
    }
}
