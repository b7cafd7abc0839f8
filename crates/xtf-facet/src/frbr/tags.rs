//! Interned bibliographic tags.
//!
//! A tag is a (kind, text) pair. Tag ids are assigned in (kind, text) order,
//! so ids of one kind are contiguous and follow lexical order, and
//! [`TagTable::next`] / [`TagTable::prev`] walk lexical neighbours.

use std::collections::HashMap;

use crate::error::FacetError;

/// Index of a tag in a [`TagTable`].
pub type TagId = u32;

/// What a tag describes. Declaration order is the canonical field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TagKind {
    /// Work title.
    Title,
    /// Author or creator.
    Author,
    /// Publication date or year.
    Date,
    /// Record identifier.
    Identifier,
}

impl TagKind {
    /// All kinds in canonical order.
    pub const ALL: [Self; 4] = [Self::Title, Self::Author, Self::Date, Self::Identifier];

    /// Classifies an index field by the words in its name.
    pub fn classify(field: &str) -> Result<Self, FacetError> {
        if field.contains("title") {
            Ok(Self::Title)
        } else if field.contains("author") || field.contains("creator") {
            Ok(Self::Author)
        } else if field.contains("date") || field.contains("year") {
            Ok(Self::Date)
        } else if field.contains("id") || field.contains("ID") {
            Ok(Self::Identifier)
        } else {
            Err(FacetError::UnknownFieldType {
                field: field.to_string(),
            })
        }
    }

    /// Whether a term carrying the given `[NNN]` marker is kept.
    /// Unmarked terms count as the primary sub-type.
    fn accepts(self, sub_type: Option<u32>) -> bool {
        match (self, sub_type) {
            (_, None) | (Self::Date, Some(_)) => true,
            (Self::Title, Some(sub)) => sub == 245,
            (Self::Author, Some(sub)) => sub == 100 || sub == 700,
            (Self::Identifier, Some(sub)) => matches!(sub, 35 | 900 | 901),
        }
    }
}

/// Strips a trailing `[NNN]` sub-type marker from a term, returning the
/// remaining text if the term should become a tag of `kind`.
pub fn normalize_term(term: &str, kind: TagKind) -> Option<&str> {
    let mut text = term.trim();
    let mut sub_type = None;

    if text.ends_with(']')
        && let Some(start) = text.rfind('[')
    {
        sub_type = text[start + 1..text.len() - 1].trim().parse::<u32>().ok();
        text = text[..start].trim();
    }

    if text.is_empty() || !kind.accepts(sub_type) {
        return None;
    }
    if kind == TagKind::Identifier && !is_qualified_id(text) {
        return None;
    }
    Some(text)
}

/// Character offset an identifier's `(` qualifier must start at or after.
const ID_QUALIFIER_START: usize = 6;

/// Whether an identifier has a code followed by a parenthesized qualifier,
/// as in `ocm12345 (OCoLC)`. Bare numbers are too weak to match records on.
fn is_qualified_id(text: &str) -> bool {
    text.chars()
        .position(|ch| ch == '(')
        .is_some_and(|at| at >= ID_QUALIFIER_START)
}

/// One interned tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// What the tag describes.
    pub kind: TagKind,
    /// Normalized term text.
    pub text: String,
}

/// All tags of a field set, ordered by (kind, text).
#[derive(Debug, Default)]
pub struct TagTable {
    /// Tags indexed by id.
    tags: Vec<Tag>,
}

impl TagTable {
    /// Number of tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// True if there are no tags.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// The tag with the given id.
    pub fn get(&self, tag: TagId) -> &Tag {
        &self.tags[tag as usize]
    }

    /// Kind of a tag.
    pub fn kind(&self, tag: TagId) -> TagKind {
        self.get(tag).kind
    }

    /// Text of a tag.
    pub fn text(&self, tag: TagId) -> &str {
        &self.get(tag).text
    }

    /// The lexically next tag of the same kind.
    pub fn next(&self, tag: TagId) -> Option<TagId> {
        let next = tag + 1;
        ((next as usize) < self.tags.len() && self.kind(next) == self.kind(tag)).then_some(next)
    }

    /// The lexically previous tag of the same kind.
    pub fn prev(&self, tag: TagId) -> Option<TagId> {
        let prev = tag.checked_sub(1)?;
        (self.kind(prev) == self.kind(tag)).then_some(prev)
    }

    /// Looks a tag up by kind and text.
    pub fn find(&self, kind: TagKind, text: &str) -> Option<TagId> {
        self.tags
            .binary_search_by(|tag| (tag.kind, tag.text.as_str()).cmp(&(kind, text)))
            .ok()
            .map(|i| i as TagId)
    }
}

/// Interns tags in arrival order, then renumbers them into table order.
#[derive(Debug, Default)]
pub struct TagInterner {
    /// Tags in arrival order.
    tags: Vec<Tag>,
    /// (kind, text) -> arrival id.
    ids: HashMap<(TagKind, String), TagId>,
}

impl TagInterner {
    /// Returns the arrival id of a tag, adding it if new.
    pub fn intern(&mut self, kind: TagKind, text: &str) -> TagId {
        if let Some(&id) = self.ids.get(&(kind, text.to_string())) {
            return id;
        }
        let id = self.tags.len() as TagId;
        self.tags.push(Tag {
            kind,
            text: text.to_string(),
        });
        self.ids.insert((kind, text.to_string()), id);
        id
    }

    /// Sorts the tags and returns the table plus a map from arrival id to
    /// final id.
    pub fn finish(self) -> (TagTable, Vec<TagId>) {
        let mut order: Vec<TagId> = (0..self.tags.len() as TagId).collect();
        order.sort_by(|&a, &b| {
            let (a, b) = (&self.tags[a as usize], &self.tags[b as usize]);
            (a.kind, &a.text).cmp(&(b.kind, &b.text))
        });

        let mut remap = vec![0; self.tags.len()];
        for (final_id, &arrival) in order.iter().enumerate() {
            remap[arrival as usize] = final_id as TagId;
        }

        let mut slots: Vec<Option<Tag>> = self.tags.into_iter().map(Some).collect();
        let tags = order
            .iter()
            .filter_map(|&arrival| slots[arrival as usize].take())
            .collect();

        (TagTable { tags }, remap)
    }
}
