//! Catalog Module
//!
//! Registry of table schemas and live row counts.
//!
//! ## Responsibilities
//! - Validate and register schemas on table creation
//! - Track the row count of every table (updated by each mutation)
//! - Load once at startup, persist on flush/close
//!
//! ## File Format (`catalog.json`)
//! ```text
//! {
//!   "version": 1,
//!   "tables": {
//!     "users": {
//!       "key":   "id",
//!       "names": ["id", "name"],
//!       "types": ["integer", "string"],
//!       "count": 2
//!     }
//!   }
//! }
//! ```
//! Persisting writes a sibling temp file and renames it over the old one, so
//! a reader never observes a half-written catalog.

mod persist;
mod registry;

pub use persist::{PersistedCatalog, PersistedTable, CATALOG_VERSION};
pub use registry::{Catalog, CatalogEntry};
