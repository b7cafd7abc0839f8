//! Top-choice narrowing.

use std::fmt;

use super::{GroupContext, GroupSelector, Next};
use crate::GroupId;

/// Sentinel depth larger than any real hierarchy.
const NO_LEVEL: usize = 999_999_999;

/// `[topChoices]`: of all parents that receive more than one group, keeps
/// only the shallowest one and forwards its groups at flush time. When two
/// parents tie on depth the first one seen wins.
#[derive(Debug, Clone)]
pub struct TopChoiceSelector {
    /// Forward unchanged during the conservative pass.
    conservative: bool,
    /// Depth of the best parent so far.
    best_level: usize,
    /// Best parent so far.
    best_parent: Option<GroupId>,
    /// Groups received under the best parent, in arrival order.
    best_children: Vec<GroupId>,
    /// First group received under each parent.
    first_child: Vec<Option<GroupId>>,
}

impl Default for TopChoiceSelector {
    fn default() -> Self {
        Self {
            conservative: false,
            best_level: NO_LEVEL,
            best_parent: None,
            best_children: Vec::new(),
            first_child: Vec::new(),
        }
    }
}

impl GroupSelector for TopChoiceSelector {
    fn reset(&mut self, ctx: &dyn GroupContext, conservative: bool) {
        self.conservative = conservative;
        self.best_level = NO_LEVEL;
        self.best_parent = None;
        self.best_children.clear();
        self.first_child.clear();
        self.first_child.resize(ctx.n_groups(), None);
    }

    fn process(&mut self, ctx: &mut dyn GroupContext, group: GroupId, next: &mut Next<'_>) {
        if self.conservative {
            next.process(ctx, group);
            return;
        }
        let Some(parent) = ctx.parent(group) else {
            return;
        };

        let Some(first) = self.first_child[parent as usize] else {
            self.first_child[parent as usize] = Some(group);
            return;
        };
        if self.best_parent == Some(parent) {
            self.best_children.push(group);
            return;
        }

        let mut level = 0;
        let mut ancestor = Some(parent);
        while let Some(g) = ancestor {
            level += 1;
            ancestor = ctx.parent(g);
        }
        if level >= self.best_level {
            return;
        }

        self.best_parent = Some(parent);
        self.best_level = level;
        self.best_children.clear();
        self.best_children.extend([first, group]);
    }

    fn flush(&mut self, ctx: &mut dyn GroupContext, next: &mut Next<'_>) {
        for &group in &self.best_children {
            next.process(ctx, group);
        }
        next.flush(ctx);
    }

    fn clone_box(&self) -> Box<dyn GroupSelector> {
        Box::new(self.clone())
    }
}

impl fmt::Display for TopChoiceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[topChoices]")
    }
}
