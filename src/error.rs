//! Error types for Tabula
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using TabulaError
pub type Result<T> = std::result::Result<T, TabulaError>;

/// Unified error type for Tabula operations
#[derive(Debug, Error)]
pub enum TabulaError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Catalog Errors
    // -------------------------------------------------------------------------
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Catalog corruption detected: {0}")]
    CorruptCatalog(String),

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    #[error("Missing key field '{0}'")]
    MissingKey(String),

    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Field '{field}' expects a {expected} value")]
    TypeMismatch { field: String, expected: String },

    #[error("Corrupt record at row {row}: {reason}")]
    CorruptRecord { row: usize, reason: String },

    #[error("Corrupt table header: {0}")]
    CorruptHeader(String),

    // -------------------------------------------------------------------------
    // Query Errors
    // -------------------------------------------------------------------------
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Unknown operator '{0}'")]
    UnknownOperator(String),

    #[error("Unknown index kind '{0}'")]
    UnknownIndexKind(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for TabulaError {
    fn from(e: serde_json::Error) -> Self {
        TabulaError::Serialization(e.to_string())
    }
}
