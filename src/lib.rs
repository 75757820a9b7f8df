//! # Tabula
//!
//! A minimal single-node record store with:
//! - Named tables, each backed by one delimited flat file
//! - Keyed create/read/update/delete and predicate queries
//! - Tombstoned deletes with slot reuse
//! - A persistent catalog of schemas and row counts
//! - Optional in-memory secondary indexes (hash and ordered)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Database                              │
//! │            (lifecycle, serialized writers)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Table Store                             │
//! │        (read file → compute rows → atomic replace)           │
//! └──────┬──────────────┬──────────────┬───────────────┬────────┘
//!        │              │              │               │
//!        ▼              ▼              ▼               ▼
//!  ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌─────────────┐
//!  │  Catalog  │  │  Record   │  │ Predicate │  │    Index    │
//!  │ (schemas, │  │   Codec   │  │ Evaluator │  │   Manager   │
//!  │  counts)  │  │           │  │           │  │ (hash/btree)│
//!  └───────────┘  └───────────┘  └───────────┘  └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use tabula::{Database, Field, FieldType, Operator, Predicate, Record, Value};
//!
//! # fn main() -> tabula::Result<()> {
//! let db = Database::open_path(std::path::Path::new("./tabula_data"))?;
//! {
//!     let users = db.create_table(
//!         "users",
//!         vec![Field::new("id", FieldType::Integer), Field::new("name", FieldType::String)],
//!         "id",
//!     )?;
//!
//!     let mut alice = Record::new();
//!     alice.insert("id".into(), Value::from(1));
//!     alice.insert("name".into(), Value::from("alice"));
//!     users.insert_record(alice)?;
//!
//!     let found = users.query_table(&[Predicate::new("name", Operator::Eq, "alice")])?;
//!     assert_eq!(found.len(), 1);
//! }
//! db.close()?;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod schema;
pub mod codec;
pub mod catalog;
pub mod predicate;
pub mod index;
pub mod storage;
pub mod database;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, TabulaError};
pub use config::Config;
pub use database::{Database, Table};
pub use index::{IndexKind, Location};
pub use predicate::{Operator, Predicate};
pub use schema::{Field, FieldType, Record, TableSchema, Value};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of Tabula
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
