//! Core data model
//!
//! Column types, table schemas, typed values and items.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of column types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// 64-bit signed integer
    Integer,
    /// 64-bit IEEE-754 float
    Float,
    /// UTF-8 text
    Text,
    /// true / false
    Boolean,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Integer => "Integer",
            ColumnType::Float => "Float",
            ColumnType::Text => "Text",
            ColumnType::Boolean => "Boolean",
        };
        f.write_str(name)
    }
}

/// A named, typed column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Table definition
///
/// Column order is the physical record layout and is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub primary_key: String,
}

impl TableSchema {
    pub fn new(
        name: impl Into<String>,
        columns: Vec<ColumnDef>,
        primary_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            columns,
            primary_key: primary_key.into(),
        }
    }

    /// Look up a column definition by name
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|col| col.name == name)
    }

    /// Physical position of a column
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.name == name)
    }

    /// Definition of the primary-key column, if the schema names a valid one
    pub fn primary_key_column(&self) -> Option<&ColumnDef> {
        self.column(&self.primary_key)
    }
}

/// A typed value stored in a column
///
/// Untagged so JSON literals map directly: `1` is an Integer, `1.5` a Float.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
}

impl Value {
    /// The column type this value belongs to
    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::Integer(_) => ColumnType::Integer,
            Value::Float(_) => ColumnType::Float,
            Value::Boolean(_) => ColumnType::Boolean,
            Value::Text(_) => ColumnType::Text,
        }
    }

    /// Convert to `target` if the value already has that type, or if it is
    /// an Integer and `target` is Float. Everything else returns `None`.
    pub fn promote_to(&self, target: ColumnType) -> Option<Value> {
        match (self, target) {
            (Value::Integer(v), ColumnType::Float) => Some(Value::Float(*v as f64)),
            (value, target) if value.column_type() == target => Some(value.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// A row: column name → value. Absent columns have no value.
pub type Item = BTreeMap<String, Value>;
