//! Field and table schema definitions

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TabulaError};

use super::value::{parse_timestamp, Value};

/// Declared type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Integer,
    String,
    Timestamp,
}

impl FieldType {
    /// Canonical tag written to the catalog
    pub fn tag(&self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::String => "string",
            FieldType::Timestamp => "timestamp",
        }
    }

    /// Convert stored text into a typed value
    ///
    /// Empty text is `Null` for every type. Returns `None` if the text does
    /// not parse as this type.
    pub fn parse_text(&self, text: &str) -> Option<Value> {
        if text.is_empty() {
            return Some(Value::Null);
        }

        match self {
            FieldType::Integer => text.trim().parse::<i64>().ok().map(Value::Integer),
            FieldType::String => Some(Value::String(text.to_string())),
            FieldType::Timestamp => parse_timestamp(text).map(Value::Timestamp),
        }
    }

    /// Bring a caller-supplied value to this type
    ///
    /// Values already of this type pass through; strings are parsed.
    /// Integer and timestamp never convert into one another.
    pub fn coerce(&self, value: Value) -> Option<Value> {
        match (self, value) {
            (_, Value::Null) => Some(Value::Null),
            (FieldType::Integer, v @ Value::Integer(_)) => Some(v),
            (FieldType::String, v @ Value::String(_)) => Some(v),
            (FieldType::Timestamp, v @ Value::Timestamp(_)) => Some(v),
            (FieldType::Integer | FieldType::Timestamp, Value::String(s)) => self.parse_text(&s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for FieldType {
    type Err = TabulaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "integer" | "int" | "<class 'int'>" => Ok(FieldType::Integer),
            "string" | "str" | "<class 'str'>" => Ok(FieldType::String),
            "timestamp" | "datetime" | "<class 'datetime.datetime'>" => Ok(FieldType::Timestamp),
            other => Err(TabulaError::InvalidSchema(format!(
                "unknown field type '{}'",
                other
            ))),
        }
    }
}

/// Map a serialized type tag back to its `FieldType`
///
/// Accepts the canonical tags plus the legacy `<class '...'>` tags.
pub fn parse_type_tag(tag: &str) -> Result<FieldType> {
    tag.parse()
        .map_err(|_| TabulaError::CorruptCatalog(format!("unknown type tag '{}'", tag)))
}

/// A named, typed column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// Schema of one table: ordered fields plus the designated key field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub fields: Vec<Field>,
    pub key_field_name: String,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, fields: Vec<Field>, key_field_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields,
            key_field_name: key_field_name.into(),
        }
    }

    /// Check the schema before it is registered
    ///
    /// Table names end up as file names, so they are limited to
    /// `[A-Za-z0-9_-]`.
    pub fn validate(&self) -> Result<()> {
        let name_ok = !self.name.is_empty()
            && self
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !name_ok {
            return Err(TabulaError::InvalidSchema(format!(
                "invalid table name '{}'",
                self.name
            )));
        }

        if self.fields.is_empty() {
            return Err(TabulaError::InvalidSchema(format!(
                "table '{}' has no fields",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(TabulaError::InvalidSchema("empty field name".to_string()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(TabulaError::InvalidSchema(format!(
                    "duplicate field '{}'",
                    field.name
                )));
            }
        }

        if !seen.contains(self.key_field_name.as_str()) {
            return Err(TabulaError::InvalidSchema(format!(
                "key field '{}' is not among the fields of '{}'",
                self.key_field_name, self.name
            )));
        }

        Ok(())
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Position of a field in schema order
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Position of the key field in schema order
    pub fn key_index(&self) -> Result<usize> {
        self.field_index(&self.key_field_name).ok_or_else(|| {
            TabulaError::InvalidSchema(format!(
                "key field '{}' is not among the fields of '{}'",
                self.key_field_name, self.name
            ))
        })
    }

    /// The key field definition
    pub fn key_field(&self) -> Result<&Field> {
        let idx = self.key_index()?;
        Ok(&self.fields[idx])
    }

    /// Field names in schema order (the table file header)
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}
