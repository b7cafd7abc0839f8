//! Selection expression language for xtf facets.
//!
//! A facet's `select` attribute decides which groups of a facet hierarchy are
//! rendered, and which of them carry document hits:
//!
//! - **Children**: `*` - every non-empty child of the current group
//! - **Descendants**: `**` - every non-empty group below the current one
//! - **Named groups**: `Fiction`, `"Science Fiction"` - one child by name
//! - **Paths**: `Fiction::*` - descend one level per step
//! - **Rank windows**: `*[1-5]` - only the first five children of each parent
//! - **Sibling expansion**: `Fiction::Mystery[siblings]` - all siblings of a match
//! - **Top choices**: `**[topChoices]` - children of the shallowest branching group
//! - **Document hits**: `*#1-10`, `*#all` - attach hits to the selected groups
//! - **Unions**: `Fiction::*|Nonfiction` - combine independent selections
//!
//! # Example
//!
//! ```
//! use xtf_select::parse;
//!
//! let expr = parse("Fiction::*[1-5]#1-10 | Nonfiction").unwrap();
//! assert_eq!(expr.unwrap().paths.len(), 2);
//! ```

#![warn(missing_docs)]

mod ast;
mod error;
mod lexer;
mod parser;

pub use ast::{DocWindow, Filter, RankRange, SelectExpr, SelectPath, Step, Target};
pub use error::{LexError, ParseError, SelectError};
pub use lexer::{Token, tokenize};
pub use parser::parse;
