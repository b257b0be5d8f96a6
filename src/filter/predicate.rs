//! Predicate definitions
//!
//! Represents filter expressions from clients.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Value;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "$eq")]
    Eq,
    #[serde(rename = "$ne", alias = "$neq")]
    Ne,
    #[serde(rename = "$gt")]
    Gt,
    #[serde(rename = "$gte")]
    Gte,
    #[serde(rename = "$lt")]
    Lt,
    #[serde(rename = "$lte")]
    Lte,
}

impl Operator {
    /// Whether the operator needs an ordering rather than just equality
    pub fn is_ordering(self) -> bool {
        !matches!(self, Operator::Eq | Operator::Ne)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Operator::Eq => "$eq",
            Operator::Ne => "$ne",
            Operator::Gt => "$gt",
            Operator::Gte => "$gte",
            Operator::Lt => "$lt",
            Operator::Lte => "$lte",
        };
        f.write_str(symbol)
    }
}

/// `column <op> value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub column: String,
    pub op: Operator,
    pub value: Value,
}

/// A filter expression
///
/// JSON shape: `{"$and": [...]}`, `{"$or": [...]}`, `{"$not": {...}}` or a
/// bare comparison `{"column": "age", "op": "$gt", "value": 30}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    #[serde(rename = "$and")]
    And(Vec<Predicate>),

    #[serde(rename = "$or")]
    Or(Vec<Predicate>),

    #[serde(rename = "$not")]
    Not(Box<Predicate>),

    #[serde(untagged)]
    Comparison(Comparison),
}

impl Predicate {
    pub fn compare(column: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Predicate::Comparison(Comparison {
            column: column.into(),
            op,
            value: value.into(),
        })
    }

    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, Operator::Eq, value)
    }

    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, Operator::Ne, value)
    }

    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, Operator::Gt, value)
    }

    pub fn gte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, Operator::Gte, value)
    }

    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, Operator::Lt, value)
    }

    pub fn lte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, Operator::Lte, value)
    }

    pub fn and(predicates: Vec<Predicate>) -> Self {
        Predicate::And(predicates)
    }

    pub fn or(predicates: Vec<Predicate>) -> Self {
        Predicate::Or(predicates)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(predicate: Predicate) -> Self {
        Predicate::Not(Box::new(predicate))
    }
}
