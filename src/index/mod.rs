//! Index Module
//!
//! Optional per-field secondary indexes mapping a field value to the
//! physical location (file + data row) of every record holding it.
//!
//! ## Responsibilities
//! - Build an index from a full table scan on demand
//! - Track inserts/deletes incrementally once built
//! - Answer equality (hash, ordered) and range (ordered) lookups
//!
//! ## Data Structure Choice
//! - `Hash`: `HashMap<Value, Vec<Location>>` for O(1) equality
//! - `Ordered`: `BTreeMap<Value, Vec<Location>>` for O(log n) + O(k) ranges
//!
//! Indexes are derivative and in-memory only; they are rebuilt from a scan
//! and are not consulted by the table's read paths.

mod manager;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Result, TabulaError};

pub use manager::IndexManager;

/// Kind of secondary index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// Exact-match lookups only
    Hash,

    /// Exact-match and range lookups
    Ordered,
}

impl FromStr for IndexKind {
    type Err = TabulaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hash" => Ok(IndexKind::Hash),
            "ordered" | "sorted" | "btree" => Ok(IndexKind::Ordered),
            _ => Err(TabulaError::UnknownIndexKind(s.to_string())),
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::Hash => f.write_str("hash"),
            IndexKind::Ordered => f.write_str("ordered"),
        }
    }
}

/// Physical location of a record
///
/// `row` is the zero-based data row (the header is not counted). Rows are
/// never physically removed, so a location stays valid across deletes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub path: PathBuf,
    pub row: usize,
}

impl Location {
    pub fn new(path: impl Into<PathBuf>, row: usize) -> Self {
        Self {
            path: path.into(),
            row,
        }
    }
}
