//! The group hierarchy abstraction.
//!
//! A facet's groups form a tree rooted at group 0, stored as parallel arrays
//! indexed by group id: `parent`, first `child`, next `sibling`. Documents
//! reach groups through *links*: [`GroupData::first_link`] gives a document's
//! first link, [`GroupData::next_link`] walks the rest, and
//! [`GroupData::link_group`] resolves a link to its group. A document linked
//! to a group is implicitly in every ancestor of that group too.
//!
//! Two implementations exist: [`StaticGroupData`](crate::StaticGroupData),
//! read once from an index field, and
//! [`FrbrGroupData`](crate::FrbrGroupData), computed per query.

use std::{borrow::Cow, cmp::Ordering, iter};

use crate::{DocId, GroupId, LinkId};

/// The root group of every hierarchy.
pub const ROOT: GroupId = 0;

/// Read access to a group hierarchy and its document links.
pub trait GroupData: Send + Sync {
    /// Name of the field the groups were read from.
    fn field(&self) -> &str;

    /// Number of groups, including the root.
    fn n_groups(&self) -> usize;

    /// Display name of a group. The root's name is empty.
    fn name(&self, group: GroupId) -> Cow<'_, str>;

    /// Parent of a group; `None` only for the root.
    fn parent(&self, group: GroupId) -> Option<GroupId>;

    /// First child of a group.
    fn child(&self, group: GroupId) -> Option<GroupId>;

    /// Next sibling of a group.
    fn sibling(&self, group: GroupId) -> Option<GroupId>;

    /// Number of direct children of a group.
    fn n_children(&self, group: GroupId) -> usize {
        let mut n = 0;
        let mut kid = self.child(group);
        while let Some(k) = kid {
            n += 1;
            kid = self.sibling(k);
        }
        n
    }

    /// First group link of a document, or `None` if it is in no group.
    fn first_link(&self, doc: DocId) -> Option<LinkId>;

    /// The link following `link` for the same document.
    fn next_link(&self, link: LinkId) -> Option<LinkId>;

    /// The group a link points at.
    fn link_group(&self, link: LinkId) -> GroupId;

    /// Looks a group up by name.
    fn find_group(&self, name: &str) -> Option<GroupId>;

    /// True if groups were computed from a result set rather than read
    /// from the index. Dynamic data knows its own counts and scores.
    fn is_dynamic(&self) -> bool;

    /// Documents in a group. Only meaningful for dynamic data.
    fn n_doc_hits(&self, _group: GroupId) -> u32 {
        0
    }

    /// Best document score in a group. Only meaningful for dynamic data.
    fn score(&self, _group: GroupId) -> f32 {
        0.0
    }

    /// Value order of two groups. Static groups are numbered in term order,
    /// so comparing ids compares values.
    fn compare(&self, a: GroupId, b: GroupId) -> Ordering {
        a.cmp(&b)
    }
}

impl dyn GroupData + '_ {
    /// Iterates over the groups a document is directly linked to.
    pub fn links(&self, doc: DocId) -> Links<'_> {
        Links {
            data: self,
            next: self.first_link(doc),
        }
    }

    /// Iterates over the direct children of a group in sibling order.
    pub fn children(&self, group: GroupId) -> Children<'_> {
        Children {
            data: self,
            next: self.child(group),
        }
    }

    /// Iterates from a group up to and including the root.
    pub fn ancestors_and_self(&self, group: GroupId) -> impl Iterator<Item = GroupId> + '_ {
        let mut next = Some(group);
        iter::from_fn(move || {
            let current = next?;
            next = self.parent(current);
            Some(current)
        })
    }
}

/// Iterator over a document's group links.
pub struct Links<'a> {
    /// Data being walked.
    data: &'a dyn GroupData,
    /// Link to yield next.
    next: Option<LinkId>,
}

impl Iterator for Links<'_> {
    type Item = GroupId;

    fn next(&mut self) -> Option<Self::Item> {
        let link = self.next?;
        self.next = self.data.next_link(link);
        Some(self.data.link_group(link))
    }
}

/// Iterator over the children of a group.
pub struct Children<'a> {
    /// Data being walked.
    data: &'a dyn GroupData,
    /// Child to yield next.
    next: Option<GroupId>,
}

impl Iterator for Children<'_> {
    type Item = GroupId;

    fn next(&mut self) -> Option<Self::Item> {
        let kid = self.next?;
        self.next = self.data.sibling(kid);
        Some(kid)
    }
}
