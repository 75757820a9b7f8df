//! Table Store
//!
//! Implements the record operations of every table directly on its flat
//! file, consulting the catalog for schema and row count.
//!
//! ## Responsibilities
//! - Point insert/get/update/delete by key
//! - Predicate scan and predicate delete
//! - Reuse of tombstoned slots on insert
//! - Row-count maintenance and index maintenance after each mutation
//!
//! Every mutation is read file → compute new rows → atomically replace file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::codec;
use crate::config::FileSyncStrategy;
use crate::error::{Result, TabulaError};
use crate::index::{IndexKind, IndexManager, Location};
use crate::predicate::{self, Operator, Predicate};
use crate::schema::{Record, TableSchema, Value};

use super::TableFile;

/// Manages the table files
///
/// ## Concurrency:
/// - `catalog`: shared with the owning `Database`, locked per call
/// - `indexes`: protected by RwLock
/// - Mutations on the same table must be serialized by the caller
pub struct TableStore {
    /// Directory holding one `{name}.csv` per table
    tables_dir: PathBuf,

    /// Shared catalog (schemas + row counts)
    catalog: Arc<RwLock<Catalog>>,

    /// Secondary indexes fed by every mutation
    indexes: RwLock<IndexManager>,

    /// Whether file rewrites are fsynced
    file_sync: FileSyncStrategy,
}

impl TableStore {
    const FILE_EXTENSION: &'static str = "csv";

    pub fn new(tables_dir: &Path, catalog: Arc<RwLock<Catalog>>, file_sync: FileSyncStrategy) -> Self {
        Self {
            tables_dir: tables_dir.to_path_buf(),
            catalog,
            indexes: RwLock::new(IndexManager::new()),
            file_sync,
        }
    }

    // =========================================================================
    // Table Lifecycle
    // =========================================================================

    /// Register a table and write its header-only file
    pub fn create_table(&self, schema: TableSchema) -> Result<()> {
        let name = schema.name.clone();
        self.catalog.write().create(schema.clone())?;

        if let Err(e) = self.table_file(&name).create(&schema) {
            let _ = self.catalog.write().remove(&name);
            return Err(e);
        }

        debug!(table = %name, fields = schema.fields.len(), "Created table");
        Ok(())
    }

    /// Delete a table's file and unregister it
    ///
    /// The catalog entry survives if the file cannot be removed.
    pub fn delete_table(&self, table_name: &str) -> Result<()> {
        if !self.catalog.read().contains(table_name) {
            return Err(TabulaError::NotFound(format!("table '{}'", table_name)));
        }

        let file = self.table_file(table_name);
        if file.exists() {
            file.remove()?;
        } else {
            warn!(table = table_name, path = %file.path().display(), "Table file already missing");
        }

        self.catalog.write().remove(table_name)?;
        self.indexes.write().drop_table(table_name);

        debug!(table = table_name, "Deleted table");
        Ok(())
    }

    // =========================================================================
    // Point Operations
    // =========================================================================

    /// Insert a record, reusing the first tombstoned slot if any
    ///
    /// Returns the location the record was written to.
    pub fn insert(&self, table_name: &str, values: Record) -> Result<Location> {
        let schema = self.schema(table_name)?;
        let key_idx = schema.key_index()?;

        let record = coerce_values(&schema, values)?;
        let key_text = record
            .get(&schema.key_field_name)
            .map(Value::to_text)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| TabulaError::MissingKey(schema.key_field_name.clone()))?;

        let file = self.table_file(table_name);
        let mut rows = file.read_rows(&schema)?;

        let mut free_slot = None;
        for (idx, row) in rows.iter().enumerate() {
            if codec::is_tombstone(row) {
                free_slot.get_or_insert(idx);
            } else if row[key_idx] == key_text {
                return Err(TabulaError::DuplicateKey(key_text));
            }
        }

        let encoded = codec::encode(&record, &schema);
        let slot = match free_slot {
            Some(idx) => {
                rows[idx] = encoded;
                idx
            }
            None => {
                rows.push(encoded);
                rows.len() - 1
            }
        };
        file.write_rows(&schema, &rows)?;

        let location = Location::new(file.path(), slot);
        self.indexes.write().note_insert(table_name, &record, &location);
        self.catalog.write().adjust_count(table_name, 1)?;

        debug!(table = table_name, key = %key_text, slot, reused = free_slot.is_some(), "Inserted record");
        Ok(location)
    }

    /// Tombstone the record with `key`
    pub fn delete(&self, table_name: &str, key: &Value) -> Result<()> {
        let schema = self.schema(table_name)?;
        let file = self.table_file(table_name);
        let mut rows = file.read_rows(&schema)?;

        let idx = find_key(&schema, &rows, key)?
            .ok_or_else(|| not_found_key(table_name, key))?;
        let old = codec::decode(&rows[idx], &schema, idx)?;

        rows[idx] = codec::tombstone(&schema);
        file.write_rows(&schema, &rows)?;

        let location = Location::new(file.path(), idx);
        self.indexes.write().note_delete(table_name, &old, &location);
        self.catalog.write().adjust_count(table_name, -1)?;

        debug!(table = table_name, key = %key, slot = idx, "Deleted record");
        Ok(())
    }

    /// Fetch the record with `key`
    pub fn get(&self, table_name: &str, key: &Value) -> Result<Record> {
        let schema = self.schema(table_name)?;
        let rows = self.table_file(table_name).read_rows(&schema)?;

        let idx = find_key(&schema, &rows, key)?
            .ok_or_else(|| not_found_key(table_name, key))?;
        codec::decode(&rows[idx], &schema, idx)
    }

    /// Overwrite the supplied fields of the record with `key`
    ///
    /// Fields absent from `values` are preserved. Supplying the key field
    /// re-keys the record, subject to the usual uniqueness check.
    pub fn update(&self, table_name: &str, key: &Value, values: Record) -> Result<()> {
        let schema = self.schema(table_name)?;
        let key_idx = schema.key_index()?;
        let changes = coerce_values(&schema, values)?;

        let file = self.table_file(table_name);
        let mut rows = file.read_rows(&schema)?;

        let idx = find_key(&schema, &rows, key)?
            .ok_or_else(|| not_found_key(table_name, key))?;
        let old = codec::decode(&rows[idx], &schema, idx)?;

        let mut updated = old.clone();
        updated.extend(changes);

        let new_key = updated
            .get(&schema.key_field_name)
            .map(Value::to_text)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| TabulaError::MissingKey(schema.key_field_name.clone()))?;
        if new_key != rows[idx][key_idx] {
            let taken = rows
                .iter()
                .enumerate()
                .any(|(i, row)| i != idx && !codec::is_tombstone(row) && row[key_idx] == new_key);
            if taken {
                return Err(TabulaError::DuplicateKey(new_key));
            }
        }

        rows[idx] = codec::encode(&updated, &schema);
        file.write_rows(&schema, &rows)?;

        let location = Location::new(file.path(), idx);
        let mut indexes = self.indexes.write();
        indexes.note_delete(table_name, &old, &location);
        indexes.note_insert(table_name, &updated, &location);

        debug!(table = table_name, key = %key, slot = idx, "Updated record");
        Ok(())
    }

    // =========================================================================
    // Scans
    // =========================================================================

    /// Every live record matching all predicates
    pub fn query(&self, table_name: &str, predicates: &[Predicate]) -> Result<Vec<Record>> {
        let schema = self.schema(table_name)?;
        let compiled = predicate::compile(predicates, &schema)?;
        let rows = self.table_file(table_name).read_rows(&schema)?;

        let mut matches = Vec::new();
        for (_, record) in live_records(&schema, &rows)? {
            if compiled.iter().all(|p| p.matches(&record)) {
                matches.push(record);
            }
        }

        debug!(table = table_name, predicates = predicates.len(), matched = matches.len(), "Queried table");
        Ok(matches)
    }

    /// Tombstone every live record matching all predicates
    ///
    /// Returns the number of records deleted; zero matches is not an error.
    pub fn delete_where(&self, table_name: &str, predicates: &[Predicate]) -> Result<usize> {
        let schema = self.schema(table_name)?;
        let compiled = predicate::compile(predicates, &schema)?;
        let file = self.table_file(table_name);
        let mut rows = file.read_rows(&schema)?;

        let doomed: Vec<(usize, Record)> = live_records(&schema, &rows)?
            .into_iter()
            .filter(|(_, record)| compiled.iter().all(|p| p.matches(record)))
            .collect();

        if doomed.is_empty() {
            return Ok(0);
        }

        for (idx, _) in &doomed {
            rows[*idx] = codec::tombstone(&schema);
        }
        file.write_rows(&schema, &rows)?;

        {
            let mut indexes = self.indexes.write();
            for (idx, record) in &doomed {
                indexes.note_delete(table_name, record, &Location::new(file.path(), *idx));
            }
        }
        self.catalog
            .write()
            .adjust_count(table_name, -(doomed.len() as i64))?;

        debug!(table = table_name, deleted = doomed.len(), "Deleted matching records");
        Ok(doomed.len())
    }

    /// Number of live rows physically present in the table file
    pub fn recount(&self, table_name: &str) -> Result<u64> {
        let schema = self.schema(table_name)?;
        let rows = self.table_file(table_name).read_rows(&schema)?;
        Ok(rows.iter().filter(|row| !codec::is_tombstone(row)).count() as u64)
    }

    /// Row count as tracked by the catalog
    pub fn count(&self, table_name: &str) -> Result<u64> {
        Ok(self.catalog.read().get(table_name)?.row_count)
    }

    // =========================================================================
    // Indexes
    // =========================================================================

    /// Build a `kind` index ("hash" or "ordered") on `field_name`
    ///
    /// Returns the number of indexed entries.
    pub fn create_index(&self, table_name: &str, field_name: &str, kind: &str) -> Result<usize> {
        let kind: IndexKind = kind.parse()?;
        let schema = self.schema(table_name)?;
        if schema.field(field_name).is_none() {
            return Err(TabulaError::UnknownField(field_name.to_string()));
        }

        let file = self.table_file(table_name);
        let rows = file.read_rows(&schema)?;
        let scanned = live_records(&schema, &rows)?
            .into_iter()
            .map(|(idx, record)| (record, Location::new(file.path(), idx)));

        Ok(self.indexes.write().build(table_name, field_name, kind, scanned))
    }

    /// Equality lookup through a built index
    ///
    /// `Ok(None)` means `field_name` has no index.
    pub fn index_lookup(&self, table_name: &str, field_name: &str, value: &Value) -> Result<Option<Vec<Location>>> {
        self.index_range(table_name, field_name, Operator::Eq, value)
    }

    /// Comparison lookup through a built index
    ///
    /// `Ok(None)` means no index can answer (none built, or a range operator
    /// against a hash index).
    pub fn index_range(
        &self,
        table_name: &str,
        field_name: &str,
        op: Operator,
        value: &Value,
    ) -> Result<Option<Vec<Location>>> {
        let schema = self.schema(table_name)?;
        let field = schema
            .field(field_name)
            .ok_or_else(|| TabulaError::UnknownField(field_name.to_string()))?;

        match field.field_type.coerce(value.clone()) {
            Some(value) if !value.is_null() => {
                Ok(self.indexes.read().lookup_range(table_name, field_name, op, &value))
            }
            // Nothing can match, but only an index able to answer `op` says so
            _ => match self.indexes.read().kind(table_name, field_name) {
                Some(IndexKind::Hash) if op.is_range() => Ok(None),
                Some(_) => Ok(Some(Vec::new())),
                None => Ok(None),
            },
        }
    }

    /// Indexed fields of a table with their kinds
    pub fn indexed_fields(&self, table_name: &str) -> Vec<(String, IndexKind)> {
        self.indexes.read().indexed_fields(table_name)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Path of a table's backing file
    pub fn table_path(&self, table_name: &str) -> PathBuf {
        self.tables_dir
            .join(format!("{}.{}", table_name, Self::FILE_EXTENSION))
    }

    /// Directory holding the table files
    pub fn tables_dir(&self) -> &Path {
        &self.tables_dir
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn schema(&self, table_name: &str) -> Result<TableSchema> {
        Ok(self.catalog.read().get(table_name)?.schema.clone())
    }

    fn table_file(&self, table_name: &str) -> TableFile {
        TableFile::new(self.table_path(table_name), self.file_sync)
    }
}

/// Check column names and coerce every supplied value to its field type
fn coerce_values(schema: &TableSchema, values: Record) -> Result<Record> {
    values
        .into_iter()
        .map(|(name, value)| {
            let field = schema
                .field(&name)
                .ok_or_else(|| TabulaError::UnknownColumn(name.clone()))?;
            let value = field
                .field_type
                .coerce(value)
                .ok_or_else(|| TabulaError::TypeMismatch {
                    field: name.clone(),
                    expected: field.field_type.to_string(),
                })?;
            Ok((name, value))
        })
        .collect()
}

/// Index of the live row whose key column equals the encoded `key`
fn find_key(schema: &TableSchema, rows: &[Vec<String>], key: &Value) -> Result<Option<usize>> {
    let key_idx = schema.key_index()?;
    let Some(key_text) = codec::encode_value(key, schema.key_field()?) else {
        return Ok(None);
    };
    if key_text.is_empty() {
        return Ok(None);
    }

    Ok(rows
        .iter()
        .position(|row| !codec::is_tombstone(row) && row[key_idx] == key_text))
}

/// Decode every non-tombstone row, paired with its row number
fn live_records(schema: &TableSchema, rows: &[Vec<String>]) -> Result<Vec<(usize, Record)>> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| !codec::is_tombstone(row))
        .map(|(idx, row)| Ok((idx, codec::decode(row, schema, idx)?)))
        .collect()
}

fn not_found_key(table_name: &str, key: &Value) -> TabulaError {
    TabulaError::NotFound(format!("key {} in table '{}'", key, table_name))
}
