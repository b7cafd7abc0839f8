//! Stages that move through the hierarchy.

use std::fmt;

use super::{GroupContext, GroupSelector, Next};
use crate::{GroupId, group_data::ROOT};

/// Starts a path: forwards the root group.
#[derive(Debug, Clone, Copy, Default)]
pub struct RootSelector;

impl GroupSelector for RootSelector {
    fn process(&mut self, ctx: &mut dyn GroupContext, _group: GroupId, next: &mut Next<'_>) {
        next.process(ctx, ROOT);
    }

    fn clone_box(&self) -> Box<dyn GroupSelector> {
        Box::new(*self)
    }
}

impl fmt::Display for RootSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "root")
    }
}

/// `*`: forwards every included child.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChildSelector;

impl GroupSelector for ChildSelector {
    fn process(&mut self, ctx: &mut dyn GroupContext, group: GroupId, next: &mut Next<'_>) {
        for kid in ctx.included_children(group) {
            next.process(ctx, kid);
        }
    }

    fn clone_box(&self) -> Box<dyn GroupSelector> {
        Box::new(*self)
    }
}

impl fmt::Display for ChildSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "*")
    }
}

/// `**`: forwards every included descendant, parents before children.
/// Excluded groups are skipped along with everything below them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescendantSelector;

impl GroupSelector for DescendantSelector {
    fn process(&mut self, ctx: &mut dyn GroupContext, group: GroupId, next: &mut Next<'_>) {
        let mut pending = ctx.included_children(group);
        pending.reverse();
        while let Some(current) = pending.pop() {
            next.process(ctx, current);
            let mut kids = ctx.included_children(current);
            kids.reverse();
            pending.extend(kids);
        }
    }

    fn clone_box(&self) -> Box<dyn GroupSelector> {
        Box::new(*self)
    }
}

impl fmt::Display for DescendantSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "**")
    }
}

/// Forwards the child with an exact name, if it is included.
#[derive(Debug, Clone)]
pub struct NameSelector {
    /// Name to match.
    name: String,
}

impl NameSelector {
    /// Creates a selector for the child called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl GroupSelector for NameSelector {
    fn process(&mut self, ctx: &mut dyn GroupContext, group: GroupId, next: &mut Next<'_>) {
        let mut kid = ctx.child(group);
        while let Some(k) = kid {
            if ctx.name(k) == self.name.as_str() {
                if ctx.should_include(k) {
                    next.process(ctx, k);
                }
                return;
            }
            kid = ctx.sibling(k);
        }
    }

    fn clone_box(&self) -> Box<dyn GroupSelector> {
        Box::new(self.clone())
    }
}

impl fmt::Display for NameSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.name)
    }
}
