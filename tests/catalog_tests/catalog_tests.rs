//! Tests for the Catalog
//!
//! These tests verify:
//! - Registering, looking up and removing tables
//! - Row count adjustments
//! - Persist/load round trip and atomic replacement
//! - Rejection of corrupt catalog files

use std::fs;
use std::path::PathBuf;

use tabula::catalog::Catalog;
use tabula::config::FileSyncStrategy;
use tabula::{Field, FieldType, TableSchema, TabulaError};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_catalog() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("catalog.json");
    (temp_dir, path)
}

fn users_schema() -> TableSchema {
    TableSchema::new(
        "users",
        vec![
            Field::new("id", FieldType::Integer),
            Field::new("name", FieldType::String),
            Field::new("joined", FieldType::Timestamp),
        ],
        "id",
    )
}

fn open(path: &PathBuf) -> Catalog {
    Catalog::load(path, FileSyncStrategy::EveryWrite).unwrap()
}

// =============================================================================
// Load Tests
// =============================================================================

#[test]
fn test_load_missing_file_is_empty() {
    let (_temp, path) = setup_temp_catalog();

    let catalog = open(&path);

    assert!(catalog.is_empty());
    assert!(!path.exists()); // Nothing written until persist
}

#[test]
fn test_load_corrupt_json_fails() {
    let (_temp, path) = setup_temp_catalog();
    fs::write(&path, b"{ not json").unwrap();

    let result = Catalog::load(&path, FileSyncStrategy::EveryWrite);
    assert!(matches!(result, Err(TabulaError::CorruptCatalog(_))));
}

#[test]
fn test_load_unknown_type_tag_fails() {
    let (_temp, path) = setup_temp_catalog();
    fs::write(
        &path,
        r#"{"tables":{"t":{"key":"a","names":["a"],"types":["blob"],"count":0}}}"#,
    )
    .unwrap();

    let result = Catalog::load(&path, FileSyncStrategy::EveryWrite);
    assert!(matches!(result, Err(TabulaError::CorruptCatalog(_))));
}

#[test]
fn test_load_mismatched_names_and_types_fails() {
    let (_temp, path) = setup_temp_catalog();
    fs::write(
        &path,
        r#"{"tables":{"t":{"key":"a","names":["a","b"],"types":["integer"]}}}"#,
    )
    .unwrap();

    let result = Catalog::load(&path, FileSyncStrategy::EveryWrite);
    assert!(matches!(result, Err(TabulaError::CorruptCatalog(_))));
}

#[test]
fn test_load_legacy_type_tags() {
    let (_temp, path) = setup_temp_catalog();
    fs::write(
        &path,
        r#"{"tables":{"people":{"key":"id","names":["id","name","born"],
            "types":["<class 'int'>","<class 'str'>","<class 'datetime.datetime'>"]}}}"#,
    )
    .unwrap();

    let catalog = open(&path);
    let entry = catalog.get("people").unwrap();

    assert_eq!(entry.row_count, 0); // Missing count defaults to zero
    assert_eq!(entry.schema.fields[0].field_type, FieldType::Integer);
    assert_eq!(entry.schema.fields[1].field_type, FieldType::String);
    assert_eq!(entry.schema.fields[2].field_type, FieldType::Timestamp);
}

// =============================================================================
// Create / Get / Remove Tests
// =============================================================================

#[test]
fn test_create_and_get() {
    let (_temp, path) = setup_temp_catalog();
    let mut catalog = open(&path);

    catalog.create(users_schema()).unwrap();

    let entry = catalog.get("users").unwrap();
    assert_eq!(entry.row_count, 0);
    assert_eq!(entry.schema, users_schema());
    assert_eq!(catalog.len(), 1);
}

#[test]
fn test_create_twice_fails() {
    let (_temp, path) = setup_temp_catalog();
    let mut catalog = open(&path);

    catalog.create(users_schema()).unwrap();
    let result = catalog.create(users_schema());

    assert!(matches!(result, Err(TabulaError::AlreadyExists(_))));
    assert_eq!(catalog.len(), 1);
}

#[test]
fn test_create_invalid_schema_fails() {
    let (_temp, path) = setup_temp_catalog();
    let mut catalog = open(&path);

    let schema = TableSchema::new("t", vec![Field::new("a", FieldType::Integer)], "missing");
    let result = catalog.create(schema);

    assert!(matches!(result, Err(TabulaError::InvalidSchema(_))));
    assert!(catalog.is_empty());
}

#[test]
fn test_get_and_remove_unknown_fail() {
    let (_temp, path) = setup_temp_catalog();
    let mut catalog = open(&path);

    assert!(matches!(catalog.get("nope"), Err(TabulaError::NotFound(_))));
    assert!(matches!(catalog.remove("nope"), Err(TabulaError::NotFound(_))));
}

#[test]
fn test_remove() {
    let (_temp, path) = setup_temp_catalog();
    let mut catalog = open(&path);

    catalog.create(users_schema()).unwrap();
    let removed = catalog.remove("users").unwrap();

    assert_eq!(removed.schema.name, "users");
    assert!(!catalog.contains("users"));
}

#[test]
fn test_list_names() {
    let (_temp, path) = setup_temp_catalog();
    let mut catalog = open(&path);

    catalog.create(users_schema()).unwrap();
    catalog
        .create(TableSchema::new("tags", vec![Field::new("tag", FieldType::String)], "tag"))
        .unwrap();

    let mut names = catalog.list_names();
    names.sort();
    assert_eq!(names, vec!["tags".to_string(), "users".to_string()]);
}

// =============================================================================
// Row Count Tests
// =============================================================================

#[test]
fn test_adjust_count() {
    let (_temp, path) = setup_temp_catalog();
    let mut catalog = open(&path);
    catalog.create(users_schema()).unwrap();

    catalog.adjust_count("users", 3).unwrap();
    catalog.adjust_count("users", -1).unwrap();

    assert_eq!(catalog.get("users").unwrap().row_count, 2);
}

#[test]
fn test_adjust_count_never_goes_negative() {
    let (_temp, path) = setup_temp_catalog();
    let mut catalog = open(&path);
    catalog.create(users_schema()).unwrap();

    catalog.adjust_count("users", -5).unwrap();

    assert_eq!(catalog.get("users").unwrap().row_count, 0);
}

#[test]
fn test_adjust_count_unknown_table_fails() {
    let (_temp, path) = setup_temp_catalog();
    let mut catalog = open(&path);

    let result = catalog.adjust_count("ghost", 1);
    assert!(matches!(result, Err(TabulaError::NotFound(_))));
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_persist_and_reload() {
    let (_temp, path) = setup_temp_catalog();

    {
        let mut catalog = open(&path);
        catalog.create(users_schema()).unwrap();
        catalog.adjust_count("users", 4).unwrap();
        catalog.persist().unwrap();
    }

    let catalog = open(&path);
    let entry = catalog.get("users").unwrap();
    assert_eq!(entry.schema, users_schema());
    assert_eq!(entry.row_count, 4);
}

#[test]
fn test_persist_is_idempotent() {
    let (_temp, path) = setup_temp_catalog();
    let mut catalog = open(&path);
    catalog.create(users_schema()).unwrap();

    catalog.persist().unwrap();
    let first = fs::read(&path).unwrap();
    catalog.persist().unwrap();
    let second = fs::read(&path).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_persist_leaves_no_temp_file() {
    let (temp, path) = setup_temp_catalog();
    let mut catalog = open(&path);
    catalog.create(users_schema()).unwrap();
    catalog.persist().unwrap();

    let entries: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(entries, vec!["catalog.json".to_string()]);
}

#[test]
fn test_persist_after_remove_drops_entry() {
    let (_temp, path) = setup_temp_catalog();

    {
        let mut catalog = open(&path);
        catalog.create(users_schema()).unwrap();
        catalog.persist().unwrap();
        catalog.remove("users").unwrap();
        catalog.persist().unwrap();
    }

    assert!(open(&path).is_empty());
}
