//! Selection expression abstract syntax tree.
//!
//! Represents parsed selections before they are compiled into a selector chain.

use std::fmt;

/// A parsed selection: one or more independent paths whose results are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectExpr {
    /// Alternative paths, in source order.
    pub paths: Vec<SelectPath>,
}

/// A path of steps walking down from the root group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectPath {
    /// Steps, outermost first.
    pub steps: Vec<Step>,
    /// Document hits to attach to each group the path selects.
    pub docs: Option<DocWindow>,
}

/// One level of a path: which groups to move to, and how to filter them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// The groups this step moves to.
    pub target: Target,
    /// Filters applied to the target groups, in source order.
    pub filters: Vec<Filter>,
}

/// The groups a step moves to, relative to the groups selected so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// `*`: all children.
    Children,
    /// `**`: all descendants, depth first.
    Descendants,
    /// A child with this exact name.
    Named(String),
}

/// A bracketed filter following a step target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `[2-5]`: keep children ranked within the range under their parent.
    Range(RankRange),
    /// `[siblings]`: expand each match to all of its siblings.
    Siblings,
    /// `[topChoices]`: keep only the children of the shallowest branching parent.
    TopChoices,
}

/// A 1-based inclusive rank range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankRange {
    /// First rank, starting at 1.
    first: u32,
    /// Last rank, inclusive. Never less than `first`.
    last: u32,
}

impl RankRange {
    /// The ranks `first..=last`, or `None` unless `1 <= first <= last`.
    pub fn new(first: u32, last: u32) -> Option<Self> {
        (first >= 1 && last >= first).then_some(Self { first, last })
    }

    /// First rank.
    pub fn first(&self) -> u32 {
        self.first
    }

    /// Last rank, inclusive.
    pub fn last(&self) -> u32 {
        self.last
    }

    /// Returns true if the 1-based `rank` falls inside the range.
    pub fn contains(&self, rank: u32) -> bool {
        rank >= self.first && rank <= self.last
    }

    /// Zero-based offset of the first rank.
    pub fn start(&self) -> u32 {
        self.first - 1
    }

    /// Number of ranks covered.
    pub fn len(&self) -> u32 {
        self.last - self.first + 1
    }

    /// Always false: a range covers at least one rank.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Which document hits to attach to a selected group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocWindow {
    /// `#all`: every matching document.
    All,
    /// `#1-10`: a window of the ranked hits.
    Range(RankRange),
}

impl fmt::Display for SelectExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, path) in self.paths.iter().enumerate() {
            if i > 0 {
                write!(f, "|")?;
            }
            write!(f, "{path}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SelectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, "::")?;
            }
            write!(f, "{step}")?;
        }
        if let Some(docs) = &self.docs {
            write!(f, "#{docs}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.target)?;
        for filter in &self.filters {
            write!(f, "[{filter}]")?;
        }
        Ok(())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Children => write!(f, "*"),
            Self::Descendants => write!(f, "**"),
            Self::Named(name) if needs_quotes(name) => write!(f, "\"{name}\""),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range(range) => write!(f, "{range}"),
            Self::Siblings => write!(f, "siblings"),
            Self::TopChoices => write!(f, "topChoices"),
        }
    }
}

impl fmt::Display for RankRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}-{}", self.first, self.last)
        }
    }
}

impl fmt::Display for DocWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Range(range) => write!(f, "{range}"),
        }
    }
}

/// Returns true if a group name cannot be written as a bare word.
fn needs_quotes(name: &str) -> bool {
    name.is_empty()
        || name.starts_with(|c: char| c.is_ascii_digit() || c == '-')
        || name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '*' | '[' | ']' | '#' | '|' | '"' | ':'))
}
