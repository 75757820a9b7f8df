//! Tests for schema types
//!
//! These tests verify:
//! - Type tag parsing (canonical and legacy tags)
//! - Text parsing and value coercion per field type
//! - Timestamp formatting and parsing
//! - Cross-type comparison rules
//! - Schema validation

use chrono::{NaiveDate, NaiveDateTime};
use std::cmp::Ordering;
use tabula::schema::{format_timestamp, parse_timestamp, parse_type_tag};
use tabula::{Field, FieldType, TableSchema, TabulaError, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, s)
        .unwrap()
}

fn users_schema() -> TableSchema {
    TableSchema::new(
        "users",
        vec![
            Field::new("id", FieldType::Integer),
            Field::new("name", FieldType::String),
        ],
        "id",
    )
}

// =============================================================================
// Type Tag Tests
// =============================================================================

#[test]
fn test_parse_canonical_type_tags() {
    assert_eq!(parse_type_tag("integer").unwrap(), FieldType::Integer);
    assert_eq!(parse_type_tag("string").unwrap(), FieldType::String);
    assert_eq!(parse_type_tag("timestamp").unwrap(), FieldType::Timestamp);
}

#[test]
fn test_parse_legacy_type_tags() {
    assert_eq!(parse_type_tag("<class 'int'>").unwrap(), FieldType::Integer);
    assert_eq!(parse_type_tag("<class 'str'>").unwrap(), FieldType::String);
    assert_eq!(
        parse_type_tag("<class 'datetime.datetime'>").unwrap(),
        FieldType::Timestamp
    );
}

#[test]
fn test_parse_unknown_type_tag_fails() {
    let result = parse_type_tag("float");
    assert!(matches!(result, Err(TabulaError::CorruptCatalog(_))));
}

#[test]
fn test_type_tag_round_trip() {
    for field_type in [FieldType::Integer, FieldType::String, FieldType::Timestamp] {
        assert_eq!(parse_type_tag(field_type.tag()).unwrap(), field_type);
    }
}

// =============================================================================
// Text Parsing / Coercion Tests
// =============================================================================

#[test]
fn test_empty_text_is_null_for_every_type() {
    for field_type in [FieldType::Integer, FieldType::String, FieldType::Timestamp] {
        assert_eq!(field_type.parse_text(""), Some(Value::Null));
    }
}

#[test]
fn test_parse_text_integer() {
    assert_eq!(FieldType::Integer.parse_text("42"), Some(Value::Integer(42)));
    assert_eq!(FieldType::Integer.parse_text("-7"), Some(Value::Integer(-7)));
    assert_eq!(FieldType::Integer.parse_text("4x2"), None);
}

#[test]
fn test_parse_text_string_passthrough() {
    assert_eq!(
        FieldType::String.parse_text(" padded, with comma "),
        Some(Value::String(" padded, with comma ".to_string()))
    );
}

#[test]
fn test_coerce_string_into_declared_type() {
    assert_eq!(
        FieldType::Integer.coerce(Value::from("15")),
        Some(Value::Integer(15))
    );
    assert_eq!(
        FieldType::Timestamp.coerce(Value::from("2024-01-02 03:04:05")),
        Some(Value::Timestamp(ts(2024, 1, 2, 3, 4, 5)))
    );
}

#[test]
fn test_coerce_rejects_wrong_types() {
    assert_eq!(FieldType::String.coerce(Value::Integer(1)), None);
    assert_eq!(
        FieldType::Integer.coerce(Value::Timestamp(ts(2024, 1, 1, 0, 0, 0))),
        None
    );
    assert_eq!(FieldType::Timestamp.coerce(Value::Integer(5)), None);
    assert_eq!(FieldType::Integer.coerce(Value::from("abc")), None);
}

#[test]
fn test_coerce_keeps_null() {
    assert_eq!(FieldType::Integer.coerce(Value::Null), Some(Value::Null));
}

// =============================================================================
// Timestamp Tests
// =============================================================================

#[test]
fn test_format_timestamp_without_fraction() {
    assert_eq!(format_timestamp(&ts(2024, 3, 5, 10, 20, 30)), "2024-03-05 10:20:30");
}

#[test]
fn test_timestamp_with_micros_round_trips() {
    let value = NaiveDate::from_ymd_opt(2024, 3, 5)
        .unwrap()
        .and_hms_micro_opt(10, 20, 30, 123_456)
        .unwrap();

    let text = format_timestamp(&value);
    assert_eq!(text, "2024-03-05 10:20:30.123456");
    assert_eq!(parse_timestamp(&text), Some(value));
}

#[test]
fn test_parse_timestamp_alternate_layouts() {
    assert_eq!(
        parse_timestamp("2024-03-05T10:20:30"),
        Some(ts(2024, 3, 5, 10, 20, 30))
    );
    assert_eq!(parse_timestamp("2024-03-05"), Some(ts(2024, 3, 5, 0, 0, 0)));
    assert_eq!(parse_timestamp("yesterday"), None);
}

// =============================================================================
// Comparison Tests
// =============================================================================

#[test]
fn test_compare_same_type_uses_native_order() {
    assert_eq!(Value::Integer(9).compare(&Value::Integer(10)), Some(Ordering::Less));
    assert_eq!(Value::from("9").compare(&Value::from("10")), Some(Ordering::Greater));
    assert_eq!(
        Value::Timestamp(ts(2024, 1, 1, 0, 0, 0)).compare(&Value::Timestamp(ts(2023, 1, 1, 0, 0, 0))),
        Some(Ordering::Greater)
    );
}

#[test]
fn test_compare_across_types_or_null_is_none() {
    assert_eq!(Value::Integer(1).compare(&Value::from("1")), None);
    assert_eq!(Value::Null.compare(&Value::Null), None);
    assert_eq!(Value::Integer(1).compare(&Value::Null), None);
}

#[test]
fn test_value_serializes_untagged() {
    let json = serde_json::to_string(&vec![
        Value::Integer(3),
        Value::from("x"),
        Value::Null,
    ])
    .unwrap();
    assert_eq!(json, r#"[3,"x",null]"#);
}

// =============================================================================
// Schema Validation Tests
// =============================================================================

#[test]
fn test_valid_schema() {
    let schema = users_schema();
    assert!(schema.validate().is_ok());
    assert_eq!(schema.key_index().unwrap(), 0);
    assert_eq!(schema.field_names(), vec!["id", "name"]);
}

#[test]
fn test_key_not_among_fields_is_invalid() {
    let schema = TableSchema::new("t", vec![Field::new("a", FieldType::Integer)], "b");
    assert!(matches!(schema.validate(), Err(TabulaError::InvalidSchema(_))));
}

#[test]
fn test_duplicate_field_is_invalid() {
    let schema = TableSchema::new(
        "t",
        vec![Field::new("a", FieldType::Integer), Field::new("a", FieldType::String)],
        "a",
    );
    assert!(matches!(schema.validate(), Err(TabulaError::InvalidSchema(_))));
}

#[test]
fn test_table_name_must_be_file_safe() {
    for bad in ["", "../escape", "a b", "x/y"] {
        let schema = TableSchema::new(bad, vec![Field::new("a", FieldType::Integer)], "a");
        assert!(
            matches!(schema.validate(), Err(TabulaError::InvalidSchema(_))),
            "name {:?} should be rejected",
            bad
        );
    }
}

#[test]
fn test_schema_without_fields_is_invalid() {
    let schema = TableSchema::new("t", vec![], "a");
    assert!(matches!(schema.validate(), Err(TabulaError::InvalidSchema(_))));
}

#[test]
fn test_field_type_from_str_rejects_unknown() {
    let result = "decimal".parse::<FieldType>();
    assert!(matches!(result, Err(TabulaError::InvalidSchema(_))));
}
