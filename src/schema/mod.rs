//! Schema Module
//!
//! Validation and persistence of table schemas.
//!
//! ## Responsibilities
//! - Reject invalid schemas before anything touches disk
//! - Encode/decode the fixed-format schema descriptor
//! - Persist one descriptor per table, load it once at open
//!
//! ## Descriptor Format
//! ```text
//! ┌───────────┬─────────────┬──────────────┐
//! │ Magic (4) │ Version (2) │ ColCount (2) │
//! ├───────────┴─────────────┴──────────────┤
//! │ Column (repeated ColCount times)       │
//! │ ┌─────────────┬──────┬──────────┐      │
//! │ │ NameLen (2) │ Name │ Type (1) │      │
//! │ └─────────────┴──────┴──────────┘      │
//! ├────────────────────────────────────────┤
//! │ PkNameLen (2) │ PkName                 │
//! ├────────────────────────────────────────┤
//! │ CRC32 of everything above (4)          │
//! └────────────────────────────────────────┘
//! ```

mod descriptor;
mod store;
mod validate;

pub use descriptor::{decode_descriptor, encode_descriptor};
pub use store::SchemaStore;
pub use validate::validate_schema;

use crate::types::ColumnType;

/// Magic bytes identifying a RowLog schema descriptor
pub(crate) const MAGIC: &[u8; 4] = b"RLSC";

/// Current descriptor format version
pub(crate) const VERSION: u16 = 1;

/// On-disk tag for a column type
pub(crate) fn type_tag(column_type: ColumnType) -> u8 {
    match column_type {
        ColumnType::Integer => 1,
        ColumnType::Float => 2,
        ColumnType::Text => 3,
        ColumnType::Boolean => 4,
    }
}

/// Column type for an on-disk tag
pub(crate) fn type_from_tag(tag: u8) -> Option<ColumnType> {
    match tag {
        1 => Some(ColumnType::Integer),
        2 => Some(ColumnType::Float),
        3 => Some(ColumnType::Text),
        4 => Some(ColumnType::Boolean),
        _ => None,
    }
}
