//! Catalog registry
//!
//! In-memory table registry backed by a single JSON file.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::FileSyncStrategy;
use crate::error::{Result, TabulaError};
use crate::schema::TableSchema;
use crate::storage::replace_file;

use super::{PersistedCatalog, PersistedTable, CATALOG_VERSION};

/// Schema and live row count of one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Table schema (immutable after creation)
    pub schema: TableSchema,

    /// Number of non-tombstone rows in the table file
    pub row_count: u64,
}

/// Registry of all tables
///
/// Not synchronized itself; share it as `Arc<RwLock<Catalog>>`.
#[derive(Debug)]
pub struct Catalog {
    /// Location of the persisted catalog file
    path: PathBuf,

    /// Table name → entry
    tables: HashMap<String, CatalogEntry>,

    /// Whether persist fsyncs before the rename
    sync: FileSyncStrategy,
}

impl Catalog {
    /// Load the catalog from `path`
    ///
    /// A missing file yields an empty catalog; nothing is written until the
    /// first `persist`.
    pub fn load(path: &Path, sync: FileSyncStrategy) -> Result<Self> {
        let mut tables = HashMap::new();

        if path.exists() {
            let bytes = fs::read(path)?;
            let persisted: PersistedCatalog = serde_json::from_slice(&bytes)
                .map_err(|e| TabulaError::CorruptCatalog(e.to_string()))?;

            if persisted.version > CATALOG_VERSION {
                return Err(TabulaError::CorruptCatalog(format!(
                    "unsupported catalog version {}",
                    persisted.version
                )));
            }

            for (name, table) in persisted.tables {
                let entry = table.into_entry(&name)?;
                tables.insert(name, entry);
            }

            info!(path = %path.display(), tables = tables.len(), "Loaded catalog");
        } else {
            info!(path = %path.display(), "No catalog found, starting empty");
        }

        Ok(Self {
            path: path.to_path_buf(),
            tables,
            sync,
        })
    }

    /// Write the whole catalog back to disk
    ///
    /// Idempotent; the previous file is replaced atomically.
    pub fn persist(&self) -> Result<()> {
        let persisted = PersistedCatalog {
            version: CATALOG_VERSION,
            tables: self
                .tables
                .iter()
                .map(|(name, entry)| (name.clone(), PersistedTable::from_entry(entry)))
                .collect(),
        };

        let bytes = serde_json::to_vec_pretty(&persisted)?;
        replace_file(&self.path, self.sync, |w| {
            w.write_all(&bytes)?;
            Ok(())
        })?;

        debug!(path = %self.path.display(), tables = self.tables.len(), "Persisted catalog");
        Ok(())
    }

    /// Register a new table with a row count of zero
    pub fn create(&mut self, schema: TableSchema) -> Result<()> {
        if self.tables.contains_key(&schema.name) {
            return Err(TabulaError::AlreadyExists(format!("table '{}'", schema.name)));
        }
        schema.validate()?;

        self.tables.insert(
            schema.name.clone(),
            CatalogEntry {
                schema,
                row_count: 0,
            },
        );
        Ok(())
    }

    /// Look up a table's entry
    pub fn get(&self, table_name: &str) -> Result<&CatalogEntry> {
        self.tables
            .get(table_name)
            .ok_or_else(|| TabulaError::NotFound(format!("table '{}'", table_name)))
    }

    /// Remove a table's entry
    pub fn remove(&mut self, table_name: &str) -> Result<CatalogEntry> {
        self.tables
            .remove(table_name)
            .ok_or_else(|| TabulaError::NotFound(format!("table '{}'", table_name)))
    }

    /// Apply `delta` to a table's row count
    ///
    /// Callers guarantee the result stays non-negative; a negative result is
    /// clamped to zero and logged.
    pub fn adjust_count(&mut self, table_name: &str, delta: i64) -> Result<()> {
        let entry = self
            .tables
            .get_mut(table_name)
            .ok_or_else(|| TabulaError::NotFound(format!("table '{}'", table_name)))?;

        let updated = entry.row_count as i64 + delta;
        if updated < 0 {
            warn!(table = table_name, count = entry.row_count, delta, "Row count would go negative");
        }
        entry.row_count = updated.max(0) as u64;
        Ok(())
    }

    /// Overwrite a table's row count (used by reconciliation)
    pub fn set_count(&mut self, table_name: &str, count: u64) -> Result<()> {
        let entry = self
            .tables
            .get_mut(table_name)
            .ok_or_else(|| TabulaError::NotFound(format!("table '{}'", table_name)))?;
        entry.row_count = count;
        Ok(())
    }

    /// All table names (order not significant)
    pub fn list_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    /// Whether a table is registered
    pub fn contains(&self, table_name: &str) -> bool {
        self.tables.contains_key(table_name)
    }

    /// Number of registered tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Path of the persisted catalog file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
