//! Terminal stages: hit windows and selection.

use std::fmt;

use xtf_select::DocWindow;

use super::{GroupContext, GroupSelector, Next};
use crate::{GroupId, hit::UNLIMITED_DOCS};

/// `#1-10`, `#all`: asks for document hits on every group it receives,
/// then forwards the group. Runs in both passes: the conservative pass is
/// how the counter learns which groups need hit queues.
#[derive(Debug, Clone, Copy)]
pub struct DocsSelector {
    /// Requested window.
    window: DocWindow,
}

impl DocsSelector {
    /// Creates a selector requesting `window`.
    pub fn new(window: DocWindow) -> Self {
        Self { window }
    }

    /// Zero-based start and size of the window.
    pub fn bounds(&self) -> (u32, u32) {
        match self.window {
            DocWindow::All => (0, UNLIMITED_DOCS),
            DocWindow::Range(range) => (range.start(), range.len()),
        }
    }
}

impl GroupSelector for DocsSelector {
    fn process(&mut self, ctx: &mut dyn GroupContext, group: GroupId, next: &mut Next<'_>) {
        let (start, max) = self.bounds();
        ctx.gather_docs(group, start, max);
        next.process(ctx, group);
    }

    fn clone_box(&self) -> Box<dyn GroupSelector> {
        Box::new(*self)
    }
}

impl fmt::Display for DocsSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.window)
    }
}

/// Ends a chain: selects every group it receives for display.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkSelector;

impl GroupSelector for MarkSelector {
    fn process(&mut self, ctx: &mut dyn GroupContext, group: GroupId, _next: &mut Next<'_>) {
        ctx.select_group(group);
    }

    fn flush(&mut self, _ctx: &mut dyn GroupContext, _next: &mut Next<'_>) {}

    fn clone_box(&self) -> Box<dyn GroupSelector> {
        Box::new(*self)
    }
}

impl fmt::Display for MarkSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mark")
    }
}
