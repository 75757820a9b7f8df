//! Storage Module
//!
//! Persistent storage layer: one delimited flat file per table.
//!
//! ## Responsibilities
//! - Read and atomically rewrite table files
//! - Point and predicate operations over the rows of a table
//! - Slot reuse so deleted rows don't grow the file unbounded
//!
//! ## File Format
//! ```text
//! ┌────────────────────────────────────────┐
//! │ Header row: field names (schema order) │
//! ├────────────────────────────────────────┤
//! │ Data row 0: f0,f1,...,fN               │
//! │ Data row 1: ,,...,      (tombstone)    │
//! │ ... (one row per slot)                 │
//! └────────────────────────────────────────┘
//! ```
//! Rows are never physically removed, so a row's offset is stable for the
//! lifetime of the table.

mod file;
mod store;

pub use file::{replace_file, TableFile};
pub use store::TableStore;
