//! Record ⇄ attribute map conversion.

use crate::attribute::{AttributeMap, AttributeValue, WireType};
use crate::error::{ConfigError, DataError, Error};
use crate::schema::{Record, RecordSchema};
use crate::value::{DataFailure, NativeKind};

/// Convert `record` into an attribute map holding exactly its included
/// fields, keyed by wire name.
///
/// A NaN or infinite float in an `N` column is a data error: numeric wire
/// text must be a decimal number. In an `S` column it is written as
/// `NaN`, `+Inf` or `-Inf`.
pub fn encode<R: Record>(record: &R) -> Result<AttributeMap, Error> {
    let schema = R::schema()?;
    let mut map = AttributeMap::with_capacity(schema.fields().len());
    for field in schema.fields() {
        let text = field.render(record);
        if field.wire_type() == WireType::Numeric
            && matches!(field.kind(), NativeKind::Float { .. })
            && matches!(text.as_str(), "NaN" | "+Inf" | "-Inf")
        {
            return Err(DataError {
                column: field.wire_name().to_string(),
                raw: text,
                kind: field.kind(),
                failure: DataFailure::NotFinite,
            }
            .into());
        }
        map.insert(field.wire_name().to_string(), AttributeValue::new(field.wire_type(), text));
    }
    Ok(map)
}

/// Merge `map` into `out`.
///
/// Fields whose column is absent keep their current value. Every column is
/// checked against the schema before anything is assigned, so a config error
/// leaves `out` untouched; a data error stops at the first failing field in
/// declaration order, after earlier fields have been assigned.
pub fn decode<R: Record>(map: &AttributeMap, out: &mut R) -> Result<(), Error> {
    let schema = R::schema()?;
    check_columns(schema, map)?;

    for field in schema.fields() {
        let Some(value) = map.get(field.wire_name()) else {
            continue;
        };
        field
            .assign(out, value.as_str())
            .map_err(|failure| DataError {
                column: field.wire_name().to_string(),
                raw: value.as_str().to_string(),
                kind: field.kind(),
                failure,
            })?;
    }
    Ok(())
}

/// Decode `map` into a fresh `R::default()`.
pub fn decode_new<R: Record + Default>(map: &AttributeMap) -> Result<R, Error> {
    let mut record = R::default();
    decode(map, &mut record)?;
    Ok(record)
}

/// Reject columns the schema cannot hold, in column-name order.
fn check_columns<R: 'static>(schema: &RecordSchema<R>, map: &AttributeMap) -> Result<(), ConfigError> {
    let mut columns: Vec<_> = map.iter().collect();
    columns.sort_unstable_by(|a, b| a.0.cmp(b.0));

    for (column, value) in columns {
        let Some(field) = schema.lookup(column) else {
            return Err(ConfigError::UnknownColumn {
                record: schema.record_name(),
                column: column.clone(),
            });
        };
        if field.wire_type() != value.wire_type() {
            return Err(ConfigError::WireTypeMismatch {
                record: schema.record_name(),
                column: column.clone(),
                expected: field.wire_type(),
                found: value.wire_type(),
            });
        }
    }
    Ok(())
}
