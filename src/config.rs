//! Configuration for Tabula
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a Tabula database
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── catalog.json     (table schemas + row counts)
    ///     └── tables/          (one {name}.csv per table)
    pub data_dir: PathBuf,

    /// Whether table file rewrites are fsynced before being renamed into place
    pub file_sync: FileSyncStrategy,

    // -------------------------------------------------------------------------
    // Catalog Configuration
    // -------------------------------------------------------------------------
    /// When the in-memory catalog is written back to disk
    pub catalog_sync: CatalogSyncStrategy,

    /// Recount every table on open and repair drifted row counts
    pub reconcile_on_open: bool,
}

/// Sync strategy for table file rewrites
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSyncStrategy {
    /// fsync the replacement file before renaming it (safest, slowest)
    EveryWrite,

    /// Leave flushing to the operating system
    OsBuffered,
}

/// Persistence strategy for the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSyncStrategy {
    /// Persist on explicit flush, close, or drop
    OnClose,

    /// Persist after every successful mutating operation
    EveryChange,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./tabula_data"),
            file_sync: FileSyncStrategy::EveryWrite,
            catalog_sync: CatalogSyncStrategy::OnClose,
            reconcile_on_open: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the table file sync strategy
    pub fn file_sync(mut self, strategy: FileSyncStrategy) -> Self {
        self.config.file_sync = strategy;
        self
    }

    /// Set the catalog persistence strategy
    pub fn catalog_sync(mut self, strategy: CatalogSyncStrategy) -> Self {
        self.config.catalog_sync = strategy;
        self
    }

    /// Enable or disable row-count reconciliation on open
    pub fn reconcile_on_open(mut self, enabled: bool) -> Self {
        self.config.reconcile_on_open = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
