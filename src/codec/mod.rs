//! Record Codec Module
//!
//! Converts between typed records and the positional text rows stored in a
//! table file.
//!
//! ## Row Layout
//! ```text
//! ┌──────────┬──────────┬─────┬──────────┐
//! │ field 0  │ field 1  │ ... │ field N  │   (schema order, comma-delimited)
//! └──────────┴──────────┴─────┴──────────┘
//! ```
//! A row whose fields are all empty is a tombstone: a deleted slot that the
//! next insert may reuse.

mod record;

pub use record::{decode, encode, encode_value, is_tombstone, tombstone};
