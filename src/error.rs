//! Error types for RowLog
//!
//! Provides a unified error type for all table operations.

use thiserror::Error;

use crate::filter::Operator;
use crate::types::ColumnType;

/// Result type alias using RowLogError
pub type Result<T> = std::result::Result<T, RowLogError>;

/// Unified error type for RowLog operations
#[derive(Debug, Error)]
pub enum RowLogError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Catalog Errors
    // -------------------------------------------------------------------------
    #[error("Table '{0}' already exists")]
    TableAlreadyExists(String),

    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Schema descriptor corrupted: {0}")]
    CorruptSchema(String),

    // -------------------------------------------------------------------------
    // Item Errors
    // -------------------------------------------------------------------------
    #[error("Item must contain primary key '{0}'")]
    MissingPrimaryKey(String),

    #[error("Type mismatch on column '{column}': expected {expected}, got {found}")]
    TypeMismatch {
        column: String,
        expected: ColumnType,
        found: ColumnType,
    },

    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    #[error("Key not found")]
    KeyNotFound,

    // -------------------------------------------------------------------------
    // Filter Errors
    // -------------------------------------------------------------------------
    #[error("Operator {operator} is not supported on {column_type} column '{column}'")]
    UnsupportedOperator {
        column: String,
        operator: Operator,
        column_type: ColumnType,
    },

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    #[error("Record too large: {0} bytes")]
    RecordTooLarge(usize),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RowLogError {
    pub(crate) fn type_mismatch(column: &str, expected: ColumnType, found: ColumnType) -> Self {
        RowLogError::TypeMismatch {
            column: column.to_string(),
            expected,
            found,
        }
    }
}
