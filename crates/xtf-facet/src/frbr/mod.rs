//! FRBR ("work") grouping of bibliographic records.
//!
//! [`FrbrData`] holds the interned title, author, date and identifier tags
//! of an index and is shared per reader. [`FrbrGroupData`] clusters one
//! result set into works using that data.

mod data;
mod group_data;
mod tags;

pub use data::FrbrData;
pub use group_data::{FRBR_FIELD, FrbrCollector, FrbrGroupData, FrbrParams};
pub use tags::{Tag, TagId, TagKind, TagTable, normalize_term};
