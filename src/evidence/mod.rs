//! Evidence-table handling for retrieved regulatory snippets.
//!
//! Retrieval snippets carry HTML fragments of requirement tables. This module
//! parses them with a tolerant hand-rolled scanner (`table`), then distills
//! the rows into required inspection items through an ordered filter cascade
//! (`filter`). Both steps are pure and idempotent.

pub mod filter;
pub mod table;
mod types;

pub use filter::find_inspection_items;
pub use table::parse_table;
pub use types::{ParsedTable, RequiredItem};
