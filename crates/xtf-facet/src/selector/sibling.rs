//! Sibling expansion.

use std::{collections::HashSet, fmt};

use super::{GroupContext, GroupSelector, Next};
use crate::GroupId;

/// `[siblings]`: the first group seen under a parent is replaced by all of
/// that parent's included children; later groups under the same parent are
/// dropped, since they were already forwarded.
#[derive(Debug, Clone, Default)]
pub struct SiblingSelector {
    /// Forward unchanged during the conservative pass.
    conservative: bool,
    /// Parents whose children were already forwarded.
    parents: HashSet<GroupId>,
}

impl GroupSelector for SiblingSelector {
    fn reset(&mut self, _ctx: &dyn GroupContext, conservative: bool) {
        self.conservative = conservative;
        self.parents.clear();
    }

    fn process(&mut self, ctx: &mut dyn GroupContext, group: GroupId, next: &mut Next<'_>) {
        let parent = match ctx.parent(group) {
            Some(parent) if !self.conservative => parent,
            // The root has no siblings.
            _ => {
                next.process(ctx, group);
                return;
            }
        };
        if !self.parents.insert(parent) {
            return;
        }
        for kid in ctx.included_children(parent) {
            next.process(ctx, kid);
        }
    }

    fn clone_box(&self) -> Box<dyn GroupSelector> {
        Box::new(self.clone())
    }
}

impl fmt::Display for SiblingSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[siblings]")
    }
}
