//! Schema validation

use std::collections::HashSet;

use crate::error::{Result, RowLogError};
use crate::types::TableSchema;

/// Check every structural invariant of a schema
///
/// The table name doubles as a directory name, so it is restricted to
/// ASCII alphanumerics, `_` and `-`.
pub fn validate_schema(schema: &TableSchema) -> Result<()> {
    if schema.name.is_empty() {
        return Err(invalid("table name is empty"));
    }
    if !schema
        .name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(invalid(format!(
            "table name '{}' may only contain ASCII letters, digits, '_' and '-'",
            schema.name
        )));
    }
    if schema.name.len() > u16::MAX as usize {
        return Err(invalid("table name too long"));
    }

    if schema.columns.is_empty() {
        return Err(invalid("schema has no columns"));
    }
    if schema.columns.len() > u16::MAX as usize {
        return Err(invalid(format!(
            "{} columns exceeds the limit of {}",
            schema.columns.len(),
            u16::MAX
        )));
    }

    let mut seen = HashSet::new();
    for column in &schema.columns {
        if column.name.is_empty() {
            return Err(invalid("column name is empty"));
        }
        if column.name.len() > u16::MAX as usize {
            return Err(invalid(format!(
                "column name of {} bytes too long",
                column.name.len()
            )));
        }
        if !seen.insert(column.name.as_str()) {
            return Err(invalid(format!("duplicate column '{}'", column.name)));
        }
    }

    if !seen.contains(schema.primary_key.as_str()) {
        return Err(invalid(format!(
            "primary key '{}' is not a column",
            schema.primary_key
        )));
    }

    Ok(())
}

fn invalid(msg: impl Into<String>) -> RowLogError {
    RowLogError::InvalidSchema(msg.into())
}
