//! Record encoding and decoding

use crate::error::{Result, TabulaError};
use crate::schema::{Field, Record, TableSchema, Value};

/// Encode a record as one text field per schema field, in schema order
///
/// Fields missing from the record are written as empty placeholders.
pub fn encode(record: &Record, schema: &TableSchema) -> Vec<String> {
    schema
        .fields
        .iter()
        .map(|field| record.get(&field.name).map(Value::to_text).unwrap_or_default())
        .collect()
}

/// Encode a single value for `field`, coercing it to the field's type first
///
/// Returns `None` if the value cannot be represented as that type.
pub fn encode_value(value: &Value, field: &Field) -> Option<String> {
    field
        .field_type
        .coerce(value.clone())
        .map(|v| v.to_text())
}

/// Decode a positional row back into a typed record
///
/// `row` is the zero-based data row number, used only in error messages.
pub fn decode(fields: &[String], schema: &TableSchema, row: usize) -> Result<Record> {
    if fields.len() != schema.fields.len() {
        return Err(TabulaError::CorruptRecord {
            row,
            reason: format!(
                "expected {} fields, found {}",
                schema.fields.len(),
                fields.len()
            ),
        });
    }

    let mut record = Record::new();
    for (field, text) in schema.fields.iter().zip(fields) {
        let value = field
            .field_type
            .parse_text(text)
            .ok_or_else(|| TabulaError::CorruptRecord {
                row,
                reason: format!("'{}' is not a valid {} for '{}'", text, field.field_type, field.name),
            })?;
        record.insert(field.name.clone(), value);
    }

    Ok(record)
}

/// True iff every positional field is empty
pub fn is_tombstone(fields: &[String]) -> bool {
    fields.iter().all(String::is_empty)
}

/// The tombstone row for a schema
pub fn tombstone(schema: &TableSchema) -> Vec<String> {
    vec![String::new(); schema.fields.len()]
}
