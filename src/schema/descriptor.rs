//! Schema descriptor codec

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{Result, RowLogError};
use crate::types::{ColumnDef, TableSchema};

use super::{type_from_tag, type_tag, validate_schema, MAGIC, VERSION};

/// Size of the CRC32 trailer
const CRC_SIZE: usize = 4;

/// Encode a schema into descriptor bytes
///
/// The schema must already be valid; lengths are bounded by `validate_schema`.
/// The table name is not stored: it is the name of the table directory.
pub fn encode_descriptor(schema: &TableSchema) -> Result<Vec<u8>> {
    validate_schema(schema)?;

    let mut buf = BytesMut::new();
    buf.put_slice(MAGIC);
    buf.put_u16_le(VERSION);
    buf.put_u16_le(schema.columns.len() as u16);
    for column in &schema.columns {
        put_name(&mut buf, &column.name);
        buf.put_u8(type_tag(column.column_type));
    }
    put_name(&mut buf, &schema.primary_key);

    let crc = crc32fast::hash(&buf);
    buf.put_u32_le(crc);
    Ok(buf.to_vec())
}

/// Decode descriptor bytes for the table called `name`
pub fn decode_descriptor(name: &str, bytes: &[u8]) -> Result<TableSchema> {
    if bytes.len() < MAGIC.len() + 2 + CRC_SIZE {
        return Err(corrupt(format!("descriptor too short ({} bytes)", bytes.len())));
    }

    let (content, mut trailer) = bytes.split_at(bytes.len() - CRC_SIZE);
    let stored_crc = trailer.get_u32_le();
    let computed_crc = crc32fast::hash(content);
    if stored_crc != computed_crc {
        return Err(corrupt(format!(
            "checksum mismatch: stored {:08x}, computed {:08x}",
            stored_crc, computed_crc
        )));
    }

    let mut buf = content;
    if &buf[..MAGIC.len()] != MAGIC {
        return Err(corrupt(format!("invalid magic {:?}", &buf[..MAGIC.len()])));
    }
    buf.advance(MAGIC.len());

    let version = buf.get_u16_le();
    if version != VERSION {
        return Err(corrupt(format!("unsupported version {}", version)));
    }

    let column_count = get_u16(&mut buf)? as usize;
    let mut columns = Vec::with_capacity(column_count);
    for _ in 0..column_count {
        let name = get_name(&mut buf)?;
        if !buf.has_remaining() {
            return Err(corrupt("truncated column type"));
        }
        let tag = buf.get_u8();
        let column_type =
            type_from_tag(tag).ok_or_else(|| corrupt(format!("unknown type tag {}", tag)))?;
        columns.push(ColumnDef::new(name, column_type));
    }
    let primary_key = get_name(&mut buf)?;

    if buf.has_remaining() {
        return Err(corrupt(format!("{} trailing bytes", buf.remaining())));
    }

    let schema = TableSchema::new(name, columns, primary_key);
    validate_schema(&schema).map_err(|e| corrupt(e.to_string()))?;
    Ok(schema)
}

fn put_name(buf: &mut BytesMut, name: &str) {
    buf.put_u16_le(name.len() as u16);
    buf.put_slice(name.as_bytes());
}

fn get_u16(buf: &mut &[u8]) -> Result<u16> {
    if buf.remaining() < 2 {
        return Err(corrupt("truncated length field"));
    }
    Ok(buf.get_u16_le())
}

fn get_name(buf: &mut &[u8]) -> Result<String> {
    let len = get_u16(buf)? as usize;
    if buf.remaining() < len {
        return Err(corrupt("truncated name"));
    }
    let name = std::str::from_utf8(&buf[..len])
        .map_err(|e| corrupt(format!("name is not UTF-8: {}", e)))?
        .to_string();
    buf.advance(len);
    Ok(name)
}

fn corrupt(msg: impl Into<String>) -> RowLogError {
    RowLogError::CorruptSchema(msg.into())
}
