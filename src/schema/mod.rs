//! Schema Module
//!
//! Passive description of a table: typed fields, the key field, and the
//! typed values a record carries.
//!
//! ## Field Types
//! | Type        | Canonical tag | Text form                       |
//! |-------------|---------------|---------------------------------|
//! | `Integer`   | `integer`     | decimal `i64`                   |
//! | `String`    | `string`      | verbatim                        |
//! | `Timestamp` | `timestamp`   | `%Y-%m-%d %H:%M:%S%.f`          |
//!
//! An empty text field is always `Value::Null`.

mod field;
mod value;

use std::collections::BTreeMap;

pub use field::{parse_type_tag, Field, FieldType, TableSchema};
pub use value::{format_timestamp, parse_timestamp, Value};

/// A decoded record: field name → typed value
pub type Record = BTreeMap<String, Value>;
