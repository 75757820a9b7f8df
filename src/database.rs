//! Database Module
//!
//! The top-level handle that coordinates all components.
//!
//! ## Responsibilities
//! - Own the catalog and hand it to the table store
//! - Load the catalog on open, persist it on flush/close/drop
//! - Reconcile catalog row counts with the table files on open
//! - Serialize mutating operations

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::config::{CatalogSyncStrategy, Config};
use crate::error::{Result, TabulaError};
use crate::index::{IndexKind, Location};
use crate::predicate::{Operator, Predicate};
use crate::schema::{Field, Record, TableSchema, Value};
use crate::storage::TableStore;

/// The main database handle
///
/// ## Concurrency Model: Serialized Writers
///
/// - **Writes** (insert/update/delete/create/drop): serialized by `write_lock`
/// - **Reads** (get/query/count): no lock; each table file is replaced by an
///   atomic rename, so a reader sees either the old or the new file
///
/// Single process only: nothing guards the files against another process.
///
/// With `CatalogSyncStrategy::EveryChange`, a record mutation whose catalog
/// persist fails still stands in the table file; the error is returned and
/// the next reconcile repairs the persisted count.
pub struct Database {
    /// Database configuration
    config: Config,

    /// Directory holding the table files
    tables_dir: PathBuf,

    /// Table registry shared with the store
    catalog: Arc<RwLock<Catalog>>,

    /// Record operations over the table files
    store: TableStore,

    /// Serializes mutating operations
    write_lock: Mutex<()>,

    /// Set once `close` has persisted the catalog
    closed: bool,
}

impl Database {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const CATALOG_FILENAME: &'static str = "catalog.json";
    const TABLES_DIR: &'static str = "tables";

    /// Open or create a database with the given config
    ///
    /// On startup:
    /// 1. Open/create data directory
    /// 2. Load the catalog (empty if none was persisted)
    /// 3. Reconcile row counts with the table files (if enabled)
    /// 4. Ready to serve requests
    pub fn open(config: Config) -> Result<Self> {
        if config.data_dir.exists() && !config.data_dir.is_dir() {
            return Err(TabulaError::Config(format!(
                "data_dir {} is not a directory",
                config.data_dir.display()
            )));
        }

        // Step 1: Create directories
        let tables_dir = config.data_dir.join(Self::TABLES_DIR);
        fs::create_dir_all(&tables_dir)?;

        // Step 2: Load catalog
        let catalog_path = config.data_dir.join(Self::CATALOG_FILENAME);
        let catalog = Catalog::load(&catalog_path, config.file_sync)?;
        let catalog = Arc::new(RwLock::new(catalog));

        // Step 3: Wire the store to the shared catalog
        let store = TableStore::new(&tables_dir, Arc::clone(&catalog), config.file_sync);

        let db = Self {
            config,
            tables_dir,
            catalog,
            store,
            write_lock: Mutex::new(()),
            closed: false,
        };

        // Step 4: Repair any drift left by an unclean shutdown
        if db.config.reconcile_on_open {
            db.reconcile()?;
        }

        info!(
            data_dir = %db.config.data_dir.display(),
            tables = db.table_count(),
            "Opened database"
        );
        Ok(db)
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    /// Bring catalog row counts back in line with the table files
    ///
    /// Entries whose file is missing are dropped. Returns the number of
    /// entries repaired.
    pub fn reconcile(&self) -> Result<usize> {
        let _write_guard = self.write_lock.lock();
        let mut repaired = 0;

        let names = self.catalog.read().list_names();
        for name in names {
            let path = self.store.table_path(&name);
            if !path.is_file() {
                warn!(table = %name, path = %path.display(), "Table file missing, dropping catalog entry");
                self.catalog.write().remove(&name)?;
                repaired += 1;
                continue;
            }

            let actual = match self.store.recount(&name) {
                Ok(actual) => actual,
                Err(e) => {
                    warn!(table = %name, error = %e, "Cannot recount table, leaving count as is");
                    continue;
                }
            };
            let recorded = self.store.count(&name)?;
            if actual != recorded {
                warn!(table = %name, recorded, actual, "Row count drifted, repairing");
                self.catalog.write().set_count(&name, actual)?;
                repaired += 1;
            }
        }

        if repaired > 0 {
            self.after_change()?;
        }
        Ok(repaired)
    }

    // =========================================================================
    // Table Lifecycle
    // =========================================================================

    /// Create a table and return a handle to it
    ///
    /// If the catalog cannot be persisted afterwards (`EveryChange`), the
    /// table is removed again and the persist error is returned.
    pub fn create_table(&self, table_name: &str, fields: Vec<Field>, key_field_name: &str) -> Result<Table<'_>> {
        let schema = TableSchema::new(table_name, fields, key_field_name);
        {
            let _write_guard = self.write_lock.lock();
            self.store.create_table(schema.clone())?;
            if let Err(e) = self.after_change() {
                if let Err(undo) = self.store.delete_table(table_name) {
                    warn!(table = table_name, error = %undo, "Failed to roll back table creation");
                }
                return Err(e);
            }
        }

        info!(table = table_name, "Created table");
        Ok(Table { db: self, schema })
    }

    /// Drop a table and delete its file
    pub fn delete_table(&self, table_name: &str) -> Result<()> {
        let _write_guard = self.write_lock.lock();
        self.store.delete_table(table_name)?;
        self.after_change()?;

        info!(table = table_name, "Deleted table");
        Ok(())
    }

    /// Handle to an existing table
    pub fn get_table(&self, table_name: &str) -> Result<Table<'_>> {
        let schema = self.catalog.read().get(table_name)?.schema.clone();
        Ok(Table { db: self, schema })
    }

    /// Names of all tables (order not significant)
    pub fn get_table_names(&self) -> Vec<String> {
        self.catalog.read().list_names()
    }

    /// Number of tables
    pub fn table_count(&self) -> usize {
        self.catalog.read().len()
    }

    // =========================================================================
    // Record Operations
    // =========================================================================

    /// Insert a record; returns where it was written
    pub fn insert(&self, table_name: &str, values: Record) -> Result<Location> {
        let _write_guard = self.write_lock.lock();
        let location = self.store.insert(table_name, values)?;
        self.after_change()?;
        Ok(location)
    }

    /// Delete the record with `key`
    pub fn delete(&self, table_name: &str, key: impl Into<Value>) -> Result<()> {
        let _write_guard = self.write_lock.lock();
        self.store.delete(table_name, &key.into())?;
        self.after_change()
    }

    /// Delete every record matching all predicates; returns how many
    pub fn delete_where(&self, table_name: &str, predicates: &[Predicate]) -> Result<usize> {
        let _write_guard = self.write_lock.lock();
        let deleted = self.store.delete_where(table_name, predicates)?;
        if deleted > 0 {
            self.after_change()?;
        }
        Ok(deleted)
    }

    /// Fetch the record with `key`
    pub fn get(&self, table_name: &str, key: impl Into<Value>) -> Result<Record> {
        self.store.get(table_name, &key.into())
    }

    /// Overwrite the supplied fields of the record with `key`
    pub fn update(&self, table_name: &str, key: impl Into<Value>, values: Record) -> Result<()> {
        let _write_guard = self.write_lock.lock();
        self.store.update(table_name, &key.into(), values)?;
        self.after_change()
    }

    /// Every record matching all predicates
    pub fn query(&self, table_name: &str, predicates: &[Predicate]) -> Result<Vec<Record>> {
        self.store.query(table_name, predicates)
    }

    /// Live row count of a table
    pub fn count(&self, table_name: &str) -> Result<u64> {
        self.store.count(table_name)
    }

    // =========================================================================
    // Indexes
    // =========================================================================

    /// Build a "hash" or "ordered" index on a field
    pub fn create_index(&self, table_name: &str, field_name: &str, kind: &str) -> Result<usize> {
        let _write_guard = self.write_lock.lock();
        self.store.create_index(table_name, field_name, kind)
    }

    /// Equality lookup through an index (`None` if the field has none)
    pub fn index_lookup(
        &self,
        table_name: &str,
        field_name: &str,
        value: impl Into<Value>,
    ) -> Result<Option<Vec<Location>>> {
        self.store.index_lookup(table_name, field_name, &value.into())
    }

    /// Comparison lookup through an index (`None` if no index can answer)
    pub fn index_range(
        &self,
        table_name: &str,
        field_name: &str,
        op: Operator,
        value: impl Into<Value>,
    ) -> Result<Option<Vec<Location>>> {
        self.store.index_range(table_name, field_name, op, &value.into())
    }

    /// Indexed fields of a table with their kinds
    pub fn indexed_fields(&self, table_name: &str) -> Vec<(String, IndexKind)> {
        self.store.indexed_fields(table_name)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Persist the catalog now
    pub fn flush(&self) -> Result<()> {
        self.catalog.read().persist()
    }

    /// Close the database gracefully
    ///
    /// Persists the catalog; dropping without `close` does the same but can
    /// only log a failure.
    pub fn close(mut self) -> Result<()> {
        self.flush()?;
        self.closed = true;
        info!(data_dir = %self.config.data_dir.display(), "Closed database");
        Ok(())
    }

    fn after_change(&self) -> Result<()> {
        match self.config.catalog_sync {
            CatalogSyncStrategy::EveryChange => self.flush(),
            CatalogSyncStrategy::OnClose => Ok(()),
        }
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the directory holding the table files
    pub fn tables_dir(&self) -> &Path {
        &self.tables_dir
    }

    /// Path of a table's backing file
    pub fn table_path(&self, table_name: &str) -> PathBuf {
        self.store.table_path(table_name)
    }

    /// Get the catalog file path
    pub fn catalog_path(&self) -> PathBuf {
        self.catalog.read().path().to_path_buf()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.flush() {
            warn!(error = %e, "Failed to persist catalog on drop");
        }
    }
}

/// Handle to one table
///
/// Carries the table's schema; every call goes through the owning database.
pub struct Table<'db> {
    db: &'db Database,
    schema: TableSchema,
}

impl<'db> Table<'db> {
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Live row count
    pub fn count(&self) -> Result<u64> {
        self.db.count(self.name())
    }

    pub fn insert_record(&self, values: Record) -> Result<Location> {
        self.db.insert(self.name(), values)
    }

    pub fn delete_record(&self, key: impl Into<Value>) -> Result<()> {
        self.db.delete(self.name(), key)
    }

    pub fn delete_records(&self, predicates: &[Predicate]) -> Result<usize> {
        self.db.delete_where(self.name(), predicates)
    }

    pub fn get_record(&self, key: impl Into<Value>) -> Result<Record> {
        self.db.get(self.name(), key)
    }

    pub fn update_record(&self, key: impl Into<Value>, values: Record) -> Result<()> {
        self.db.update(self.name(), key, values)
    }

    pub fn query_table(&self, predicates: &[Predicate]) -> Result<Vec<Record>> {
        self.db.query(self.name(), predicates)
    }

    pub fn create_index(&self, field_name: &str, kind: &str) -> Result<usize> {
        self.db.create_index(self.name(), field_name, kind)
    }
}
