//! Group selectors: composable stages that decide which groups of a facet
//! are rendered and which collect document hits.
//!
//! A [`SelectorChain`] is an ordered list of stages. Each stage receives
//! groups from the stage before it and forwards some of them, possibly
//! different ones, to the rest of the chain through [`Next`]. A chain is
//! always run twice per query:
//!
//! - The *conservative* pass runs before any hits are counted. It must
//!   reach every group that could possibly be selected, so filters that
//!   depend on counts forward everything. Its only effect is to tell the
//!   counter which groups need hit queues.
//! - The *real* pass runs once counts are final and the hierarchy is
//!   sorted. Its terminal [`MarkSelector`] decides what is displayed.

mod compile;
mod docs;
mod path;
mod range;
mod sibling;
mod top_choice;
mod union;

use std::{borrow::Cow, fmt};

pub use compile::compile;
pub use docs::{DocsSelector, MarkSelector};
pub use path::{ChildSelector, DescendantSelector, NameSelector, RootSelector};
pub use range::RangeSelector;
pub use sibling::SiblingSelector;
pub use top_choice::TopChoiceSelector;
pub use union::UnionSelector;

use crate::{GroupId, group_data::ROOT};

/// The view of a group counter that selectors work against.
///
/// `child` and `sibling` follow the counter's current sort order, which
/// may differ from the group data's own order.
pub trait GroupContext {
    /// Number of groups, including the root.
    fn n_groups(&self) -> usize;

    /// Parent of a group.
    fn parent(&self, group: GroupId) -> Option<GroupId>;

    /// First child of a group in display order.
    fn child(&self, group: GroupId) -> Option<GroupId>;

    /// Next sibling of a group in display order.
    fn sibling(&self, group: GroupId) -> Option<GroupId>;

    /// Display name of a group.
    fn name(&self, group: GroupId) -> Cow<'_, str>;

    /// False if the group is empty and empty groups are hidden.
    fn should_include(&self, group: GroupId) -> bool;

    /// Matching documents in a group so far.
    fn n_doc_hits(&self, group: GroupId) -> u32;

    /// True if the group itself (not just a descendant) is selected.
    fn is_selected(&self, group: GroupId) -> bool;

    /// Selects a group for display, along with its ancestors.
    fn select_group(&mut self, group: GroupId);

    /// Requests the hits ranked `start..start + max` for a group.
    fn gather_docs(&mut self, group: GroupId, start: u32, max: u32);
}

impl dyn GroupContext + '_ {
    /// Children of `group` that pass [`GroupContext::should_include`], in
    /// display order.
    pub fn included_children(&self, group: GroupId) -> Vec<GroupId> {
        let mut kids = Vec::new();
        let mut kid = self.child(group);
        while let Some(k) = kid {
            if self.should_include(k) {
                kids.push(k);
            }
            kid = self.sibling(k);
        }
        kids
    }
}

/// One stage of a selector chain.
pub trait GroupSelector: fmt::Display + fmt::Debug + Send + Sync {
    /// Prepares the stage for a pass over the hierarchy.
    fn reset(&mut self, _ctx: &dyn GroupContext, _conservative: bool) {}

    /// Handles one group forwarded from the previous stage.
    fn process(&mut self, ctx: &mut dyn GroupContext, group: GroupId, next: &mut Next<'_>);

    /// Called once after the last group of a pass.
    fn flush(&mut self, ctx: &mut dyn GroupContext, next: &mut Next<'_>) {
        next.flush(ctx);
    }

    /// Clones the stage behind a box.
    fn clone_box(&self) -> Box<dyn GroupSelector>;
}

impl Clone for Box<dyn GroupSelector> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// The remainder of a chain, as seen by one stage.
pub struct Next<'a> {
    /// Stages after the current one.
    stages: &'a mut [Box<dyn GroupSelector>],
}

impl Next<'_> {
    /// Forwards a group to the following stage, if any.
    pub fn process(&mut self, ctx: &mut dyn GroupContext, group: GroupId) {
        if let Some((stage, rest)) = self.stages.split_first_mut() {
            stage.process(ctx, group, &mut Next { stages: rest });
        }
    }

    /// Flushes the following stage, if any.
    pub fn flush(&mut self, ctx: &mut dyn GroupContext) {
        if let Some((stage, rest)) = self.stages.split_first_mut() {
            stage.flush(ctx, &mut Next { stages: rest });
        }
    }
}

/// An ordered, owned list of selector stages.
#[derive(Clone)]
pub struct SelectorChain {
    /// Stages, first to last.
    stages: Vec<Box<dyn GroupSelector>>,
}

impl SelectorChain {
    /// Creates a chain from its stages.
    pub fn new(stages: Vec<Box<dyn GroupSelector>>) -> Self {
        Self { stages }
    }

    /// The chain that selects only the root group.
    pub fn root_only() -> Self {
        Self::new(vec![Box::new(RootSelector), Box::new(MarkSelector)])
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// True if the chain has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Resets every stage for a new pass.
    pub fn reset(&mut self, ctx: &dyn GroupContext, conservative: bool) {
        for stage in &mut self.stages {
            stage.reset(ctx, conservative);
        }
    }

    /// Feeds one group through the chain and flushes it, without resetting.
    pub fn feed(&mut self, ctx: &mut dyn GroupContext, group: GroupId) {
        let mut next = Next {
            stages: &mut self.stages,
        };
        next.process(ctx, group);
        next.flush(ctx);
    }

    /// Runs a complete pass starting at the root.
    pub fn run(&mut self, ctx: &mut dyn GroupContext, conservative: bool) {
        self.reset(ctx, conservative);
        self.feed(ctx, ROOT);
    }
}

impl Default for SelectorChain {
    fn default() -> Self {
        Self::root_only()
    }
}

impl fmt::Display for SelectorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stage) in self.stages.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{stage}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for SelectorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SelectorChain({self})")
    }
}


#[cfg(test)]
mod tests {
    use super::{testing::Tree, *};

    fn tree() -> Tree {
        Tree::new(&[
            ("", None, 5),
            ("a", Some(0), 3),
            ("b", Some(0), 0),
            ("c", Some(0), 2),
        ])
    }

    #[test]
    fn root_only_marks_root() {
        let mut ctx = tree();
        let mut chain = SelectorChain::root_only();
        chain.run(&mut ctx, false);
        assert_eq!(ctx.selected, vec![ROOT]);
        assert_eq!(chain.to_string(), "root -> mark");
    }

    #[test]
    fn included_children_skip_empty() {
        let mut ctx = tree();
        let view: &dyn GroupContext = &ctx;
        assert_eq!(view.included_children(ROOT), vec![1, 3]);

        ctx.hide_empty = false;
        let view: &dyn GroupContext = &ctx;
        assert_eq!(view.included_children(ROOT), vec![1, 2, 3]);
    }

    #[test]
    fn empty_chain_is_a_no_op() {
        let mut ctx = tree();
        let mut chain = SelectorChain::new(Vec::new());
        chain.run(&mut ctx, false);
        assert!(chain.is_empty());
        assert!(ctx.selected.is_empty());
    }

    #[test]
    fn stages_forward_in_order() {
        let mut ctx = tree();
        let mut chain = SelectorChain::new(vec![
            Box::new(RootSelector),
            Box::new(ChildSelector),
            Box::new(MarkSelector),
        ]);
        chain.run(&mut ctx, false);
        assert_eq!(ctx.selected, vec![1, 3]);
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.to_string(), "root -> * -> mark");
    }

    #[test]
    fn clones_are_independent() {
        let chain = SelectorChain::new(vec![
            Box::new(RootSelector),
            Box::new(SiblingSelector::default()),
            Box::new(MarkSelector),
        ]);
        let mut copy = chain.clone();
        let mut ctx = tree();
        copy.run(&mut ctx, false);
        assert_eq!(copy.to_string(), chain.to_string());
        assert_eq!(format!("{chain:?}"), "SelectorChain(root -> [siblings] -> mark)");
    }
}
