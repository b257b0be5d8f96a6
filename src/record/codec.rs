//! Record codec
//!
//! Encode/decode plan resolved once per table from its schema.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{Result, RowLogError};
use crate::types::{ColumnType, Item, TableSchema, Value};

use super::{LENGTH_PREFIX_SIZE, MAX_RECORD_BODY};

/// Fixed encode/decode plan for one table
///
/// Built from the schema at table-open time; column order, types and the
/// primary-key position are never re-derived per record.
#[derive(Debug, Clone)]
pub struct RecordCodec {
    /// (name, type) in physical order
    columns: Vec<(String, ColumnType)>,
    /// Position of the primary-key column
    key_position: usize,
    /// ceil(n_columns / 8)
    bitmap_len: usize,
}

impl RecordCodec {
    /// Build the plan for a schema
    pub fn new(schema: &TableSchema) -> Result<Self> {
        let key_position = schema.position(&schema.primary_key).ok_or_else(|| {
            RowLogError::InvalidSchema(format!(
                "primary key '{}' is not a column",
                schema.primary_key
            ))
        })?;

        let columns: Vec<(String, ColumnType)> = schema
            .columns
            .iter()
            .map(|col| (col.name.clone(), col.column_type))
            .collect();
        let bitmap_len = columns.len().div_ceil(8);

        Ok(Self {
            columns,
            key_position,
            bitmap_len,
        })
    }

    /// Type of the primary-key column
    pub fn key_type(&self) -> ColumnType {
        self.columns[self.key_position].1
    }

    /// Name of the primary-key column
    pub fn key_name(&self) -> &str {
        &self.columns[self.key_position].0
    }

    // =========================================================================
    // Encoding
    // =========================================================================

    /// Encode an item into a complete record (length prefix included)
    pub fn encode(&self, item: &Item) -> Result<Vec<u8>> {
        if let Some(unknown) = item
            .keys()
            .find(|name| !self.columns.iter().any(|(col, _)| col == *name))
        {
            return Err(RowLogError::UnknownColumn(unknown.clone()));
        }
        if !item.contains_key(self.key_name()) {
            return Err(RowLogError::MissingPrimaryKey(self.key_name().to_string()));
        }

        let mut bitmap = vec![0u8; self.bitmap_len];
        let mut fields = BytesMut::new();

        for (i, (name, column_type)) in self.columns.iter().enumerate() {
            let Some(value) = item.get(name) else {
                continue;
            };
            if value.column_type() != *column_type {
                return Err(RowLogError::type_mismatch(
                    name,
                    *column_type,
                    value.column_type(),
                ));
            }
            bitmap[i / 8] |= 1 << (i % 8);
            put_value(&mut fields, value)?;
        }

        let body_len = self.bitmap_len + fields.len();
        if body_len > MAX_RECORD_BODY {
            return Err(RowLogError::RecordTooLarge(body_len));
        }

        let mut record = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + body_len);
        record.put_u32_le(body_len as u32);
        record.put_slice(&bitmap);
        record.put_slice(&fields);
        Ok(record.to_vec())
    }

    /// Encode a bare primary-key value into index-key bytes
    ///
    /// Same bytes as the stored field, minus the text length prefix.
    pub fn encode_key(&self, key: &Value) -> Result<Vec<u8>> {
        if key.column_type() != self.key_type() {
            return Err(RowLogError::type_mismatch(
                self.key_name(),
                self.key_type(),
                key.column_type(),
            ));
        }
        let bytes = match key {
            Value::Integer(v) => v.to_le_bytes().to_vec(),
            Value::Float(v) => v.to_le_bytes().to_vec(),
            Value::Boolean(v) => vec![u8::from(*v)],
            Value::Text(v) => v.as_bytes().to_vec(),
        };
        Ok(bytes)
    }

    // =========================================================================
    // Decoding
    // =========================================================================

    /// Decode a complete record into an item
    pub fn decode(&self, record: &[u8]) -> Result<Item> {
        let (bitmap, mut fields) = self.split_record(record)?;

        let mut item = Item::new();
        for (i, (name, column_type)) in self.columns.iter().enumerate() {
            if !is_present(bitmap, i) {
                continue;
            }
            let value = read_value(&mut fields, *column_type, name)?;
            item.insert(name.clone(), value);
        }

        if fields.has_remaining() {
            return Err(RowLogError::CorruptRecord(format!(
                "{} trailing bytes after last field",
                fields.remaining()
            )));
        }
        Ok(item)
    }

    /// Extract the primary-key bytes without decoding other fields
    ///
    /// Fields before the key are skipped by width; fields after it are
    /// never touched.
    pub fn decode_key(&self, record: &[u8]) -> Result<Vec<u8>> {
        let (bitmap, mut fields) = self.split_record(record)?;

        for (i, (name, column_type)) in self.columns.iter().enumerate() {
            if !is_present(bitmap, i) {
                continue;
            }
            let raw = take_field(&mut fields, *column_type, name)?;
            if i == self.key_position {
                return Ok(raw.to_vec());
            }
        }
        // split_record already checked the key bit
        Err(RowLogError::CorruptRecord(
            "primary key field missing".to_string(),
        ))
    }

    /// Validate framing and presence bits; return (bitmap, field bytes)
    fn split_record<'a>(&self, record: &'a [u8]) -> Result<(&'a [u8], &'a [u8])> {
        if record.len() < LENGTH_PREFIX_SIZE {
            return Err(RowLogError::CorruptRecord(format!(
                "record shorter than length prefix ({} bytes)",
                record.len()
            )));
        }
        let mut prefix = &record[..LENGTH_PREFIX_SIZE];
        let total_len = prefix.get_u32_le() as usize;
        let body = &record[LENGTH_PREFIX_SIZE..];

        if total_len > body.len() {
            return Err(RowLogError::CorruptRecord(format!(
                "record length {} exceeds available {} bytes",
                total_len,
                body.len()
            )));
        }
        if total_len < body.len() {
            return Err(RowLogError::CorruptRecord(format!(
                "record length {} leaves {} unaccounted bytes",
                total_len,
                body.len() - total_len
            )));
        }
        if body.len() < self.bitmap_len {
            return Err(RowLogError::CorruptRecord(
                "record shorter than presence bitmap".to_string(),
            ));
        }

        let (bitmap, fields) = body.split_at(self.bitmap_len);

        // Padding bits past the last column must be clear
        for i in self.columns.len()..self.bitmap_len * 8 {
            if is_present(bitmap, i) {
                return Err(RowLogError::CorruptRecord(format!(
                    "presence bit {} set beyond {} columns",
                    i,
                    self.columns.len()
                )));
            }
        }
        if !is_present(bitmap, self.key_position) {
            return Err(RowLogError::CorruptRecord(format!(
                "primary key '{}' not present",
                self.key_name()
            )));
        }

        Ok((bitmap, fields))
    }
}

// =============================================================================
// Field Helpers
// =============================================================================

fn is_present(bitmap: &[u8], i: usize) -> bool {
    bitmap[i / 8] & (1 << (i % 8)) != 0
}

fn put_value(buf: &mut BytesMut, value: &Value) -> Result<()> {
    match value {
        Value::Integer(v) => buf.put_i64_le(*v),
        Value::Float(v) => buf.put_f64_le(*v),
        Value::Boolean(v) => buf.put_u8(u8::from(*v)),
        Value::Text(v) => {
            if v.len() > u32::MAX as usize {
                return Err(RowLogError::RecordTooLarge(v.len()));
            }
            buf.put_u32_le(v.len() as u32);
            buf.put_slice(v.as_bytes());
        }
    }
    Ok(())
}

/// Advance past one field and return its payload bytes
/// (for text, the bytes after the length prefix)
fn take_field<'a>(buf: &mut &'a [u8], column_type: ColumnType, column: &str) -> Result<&'a [u8]> {
    let width = match column_type {
        ColumnType::Integer | ColumnType::Float => 8,
        ColumnType::Boolean => 1,
        ColumnType::Text => {
            if buf.remaining() < 4 {
                return Err(truncated(column));
            }
            let len = buf.get_u32_le() as usize;
            if buf.remaining() < len {
                return Err(RowLogError::CorruptRecord(format!(
                    "text length {} of column '{}' overruns record",
                    len, column
                )));
            }
            len
        }
    };
    if buf.remaining() < width {
        return Err(truncated(column));
    }
    let current: &'a [u8] = *buf;
    let (field, rest) = current.split_at(width);
    *buf = rest;
    Ok(field)
}

fn read_value(buf: &mut &[u8], column_type: ColumnType, column: &str) -> Result<Value> {
    let mut raw = take_field(buf, column_type, column)?;
    let value = match column_type {
        ColumnType::Integer => Value::Integer(raw.get_i64_le()),
        ColumnType::Float => Value::Float(raw.get_f64_le()),
        ColumnType::Boolean => match raw.get_u8() {
            0 => Value::Boolean(false),
            1 => Value::Boolean(true),
            other => {
                return Err(RowLogError::CorruptRecord(format!(
                    "invalid boolean byte {} in column '{}'",
                    other, column
                )))
            }
        },
        ColumnType::Text => {
            let text = std::str::from_utf8(raw).map_err(|e| {
                RowLogError::CorruptRecord(format!("invalid UTF-8 in column '{}': {}", column, e))
            })?;
            Value::Text(text.to_string())
        }
    };
    Ok(value)
}

fn truncated(column: &str) -> RowLogError {
    RowLogError::CorruptRecord(format!("field '{}' truncated", column))
}
