//! Persisted (on-disk) form of the catalog

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TabulaError};
use crate::schema::{parse_type_tag, Field, TableSchema};

use super::CatalogEntry;

/// Current catalog file format version
pub const CATALOG_VERSION: u32 = 1;

/// Whole catalog file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedCatalog {
    /// Format version (files without one are treated as version 1)
    #[serde(default = "default_version")]
    pub version: u32,

    /// Table name → persisted entry
    #[serde(default)]
    pub tables: BTreeMap<String, PersistedTable>,
}

/// One table's persisted entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedTable {
    /// Key field name
    pub key: String,

    /// Field names in schema order
    pub names: Vec<String>,

    /// Field type tags in schema order
    pub types: Vec<String>,

    /// Live row count
    #[serde(default)]
    pub count: u64,
}

fn default_version() -> u32 {
    CATALOG_VERSION
}

impl PersistedTable {
    pub fn from_entry(entry: &CatalogEntry) -> Self {
        let schema = &entry.schema;
        Self {
            key: schema.key_field_name.clone(),
            names: schema.fields.iter().map(|f| f.name.clone()).collect(),
            types: schema
                .fields
                .iter()
                .map(|f| f.field_type.tag().to_string())
                .collect(),
            count: entry.row_count,
        }
    }

    /// Rebuild the in-memory entry, decoding type tags
    pub fn into_entry(self, table_name: &str) -> Result<CatalogEntry> {
        if self.names.len() != self.types.len() {
            return Err(TabulaError::CorruptCatalog(format!(
                "table '{}' has {} field names but {} types",
                table_name,
                self.names.len(),
                self.types.len()
            )));
        }

        let fields = self
            .names
            .into_iter()
            .zip(self.types.iter())
            .map(|(name, tag)| Ok(Field::new(name, parse_type_tag(tag)?)))
            .collect::<Result<Vec<_>>>()?;

        let schema = TableSchema::new(table_name, fields, self.key);
        schema
            .validate()
            .map_err(|e| TabulaError::CorruptCatalog(e.to_string()))?;

        Ok(CatalogEntry {
            schema,
            row_count: self.count,
        })
    }
}
