//! Filter evaluation

use std::cmp::Ordering;

use crate::error::{Result, RowLogError};
use crate::types::{ColumnType, Item, TableSchema, Value};

use super::{Comparison, Operator, Predicate};

/// A predicate checked against one schema, ready to run on many items
#[derive(Debug, Clone)]
pub struct CompiledFilter<'p> {
    predicate: &'p Predicate,
}

impl<'p> CompiledFilter<'p> {
    /// Validate every comparison against `schema`
    ///
    /// Fails with `UnknownColumn`, `TypeMismatch` or `UnsupportedOperator`.
    pub fn compile(predicate: &'p Predicate, schema: &TableSchema) -> Result<Self> {
        check(predicate, schema)?;
        Ok(Self { predicate })
    }

    /// Evaluate against an item decoded with the same schema
    pub fn matches(&self, item: &Item) -> bool {
        eval(self.predicate, item)
    }
}

/// Validate and evaluate in one step
pub fn evaluate(predicate: &Predicate, schema: &TableSchema, item: &Item) -> Result<bool> {
    Ok(CompiledFilter::compile(predicate, schema)?.matches(item))
}

fn check(predicate: &Predicate, schema: &TableSchema) -> Result<()> {
    match predicate {
        Predicate::Comparison(cmp) => check_comparison(cmp, schema),
        Predicate::And(children) | Predicate::Or(children) => children
            .iter()
            .try_for_each(|child| check(child, schema)),
        Predicate::Not(child) => check(child, schema),
    }
}

fn check_comparison(cmp: &Comparison, schema: &TableSchema) -> Result<()> {
    let column = schema
        .column(&cmp.column)
        .ok_or_else(|| RowLogError::UnknownColumn(cmp.column.clone()))?;

    let literal_type = cmp.value.column_type();
    let compatible = match column.column_type {
        ColumnType::Integer | ColumnType::Float => {
            matches!(literal_type, ColumnType::Integer | ColumnType::Float)
        }
        other => other == literal_type,
    };
    if !compatible {
        return Err(RowLogError::type_mismatch(
            &cmp.column,
            column.column_type,
            literal_type,
        ));
    }

    if column.column_type == ColumnType::Boolean && cmp.op.is_ordering() {
        return Err(RowLogError::UnsupportedOperator {
            column: cmp.column.clone(),
            operator: cmp.op,
            column_type: ColumnType::Boolean,
        });
    }
    Ok(())
}

fn eval(predicate: &Predicate, item: &Item) -> bool {
    match predicate {
        Predicate::Comparison(cmp) => match item.get(&cmp.column) {
            Some(stored) => apply(cmp.op, compare(stored, &cmp.value)),
            None => false,
        },
        Predicate::And(children) => children.iter().all(|child| eval(child, item)),
        Predicate::Or(children) => children.iter().any(|child| eval(child, item)),
        Predicate::Not(child) => !eval(child, item),
    }
}

/// Order `stored` relative to `literal`; `None` when unordered (NaN or
/// incompatible types)
fn compare(stored: &Value, literal: &Value) -> Option<Ordering> {
    match (stored, literal) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::Integer(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
        (Value::Float(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::Text(a), Value::Text(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
        (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn apply(op: Operator, ordering: Option<Ordering>) -> bool {
    match op {
        Operator::Eq => ordering == Some(Ordering::Equal),
        Operator::Ne => ordering != Some(Ordering::Equal),
        Operator::Gt => ordering == Some(Ordering::Greater),
        Operator::Gte => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        Operator::Lt => ordering == Some(Ordering::Less),
        Operator::Lte => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
    }
}
