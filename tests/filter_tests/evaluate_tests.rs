//! Tests for the Filter Evaluator
//!
//! These tests verify:
//! - Comparison operators across column types
//! - And / Or / Not combinators, including empty ones
//! - Absent columns never match a comparison
//! - Predicates are checked against the schema before evaluation
//! - JSON predicate shape

use rowlog::filter::{evaluate, CompiledFilter};
use rowlog::{ColumnDef, ColumnType, Item, Operator, Predicate, RowLogError, TableSchema, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn schema() -> TableSchema {
    TableSchema::new(
        "people",
        vec![
            ColumnDef::new("id", ColumnType::Integer),
            ColumnDef::new("age", ColumnType::Integer),
            ColumnDef::new("name", ColumnType::Text),
            ColumnDef::new("score", ColumnType::Float),
            ColumnDef::new("admin", ColumnType::Boolean),
        ],
        "id",
    )
}

fn person(id: i64, age: Option<i64>) -> Item {
    let mut item = Item::new();
    item.insert("id".into(), Value::Integer(id));
    if let Some(age) = age {
        item.insert("age".into(), Value::Integer(age));
    }
    item
}

fn ids_matching(predicate: &Predicate, items: &[Item]) -> Vec<i64> {
    let schema = schema();
    let filter = CompiledFilter::compile(predicate, &schema).unwrap();
    items
        .iter()
        .filter(|item| filter.matches(item))
        .map(|item| match item["id"] {
            Value::Integer(id) => id,
            ref other => panic!("unexpected id {:?}", other),
        })
        .collect()
}

fn check(predicate: Predicate, item: &Item) -> bool {
    evaluate(&predicate, &schema(), item).unwrap()
}

// =============================================================================
// Combinator Tests
// =============================================================================

#[test]
fn test_or_of_and() {
    let items = vec![
        person(1, Some(10)),
        person(2, Some(20)),
        person(3, Some(30)),
    ];
    let predicate = Predicate::or(vec![
        Predicate::eq("id", 1),
        Predicate::and(vec![Predicate::gt("id", 1), Predicate::lte("id", 2)]),
    ]);

    assert_eq!(ids_matching(&predicate, &items), vec![1, 2]);
}

#[test]
fn test_empty_combinators() {
    let item = person(1, None);
    assert!(check(Predicate::and(vec![]), &item));
    assert!(!check(Predicate::or(vec![]), &item));
}

#[test]
fn test_not_negates() {
    let items = vec![person(1, Some(10)), person(2, Some(20)), person(3, None)];

    assert_eq!(
        ids_matching(&Predicate::not(Predicate::gte("age", 20)), &items),
        vec![1, 3]
    );
    assert_eq!(
        ids_matching(&Predicate::not(Predicate::or(vec![])), &items),
        vec![1, 2, 3]
    );
}

// =============================================================================
// Comparison Tests
// =============================================================================

#[test]
fn test_integer_operators() {
    let item = person(5, Some(40));
    assert!(check(Predicate::eq("age", 40), &item));
    assert!(check(Predicate::ne("age", 41), &item));
    assert!(check(Predicate::gt("age", 39), &item));
    assert!(check(Predicate::gte("age", 40), &item));
    assert!(check(Predicate::lt("age", 41), &item));
    assert!(check(Predicate::lte("age", 40), &item));
    assert!(!check(Predicate::gt("age", 40), &item));
    assert!(!check(Predicate::lt("age", 40), &item));
}

#[test]
fn test_absent_column_is_false_for_every_operator() {
    let item = person(1, None);
    for op in [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
    ] {
        assert!(!check(Predicate::compare("age", op, 10), &item), "{}", op);
    }
}

#[test]
fn test_text_orders_bytewise() {
    let mut item = person(1, None);
    item.insert("name".into(), Value::from("Zoe"));

    assert!(check(Predicate::gt("name", "Adam"), &item));
    // Uppercase sorts before lowercase
    assert!(check(Predicate::lt("name", "adam"), &item));
    assert!(check(Predicate::eq("name", "Zoe"), &item));
    assert!(!check(Predicate::eq("name", "zoe"), &item));
}

#[test]
fn test_float_column_with_integer_literal() {
    let mut item = person(1, None);
    item.insert("score".into(), Value::Float(2.5));

    assert!(check(Predicate::gt("score", 2), &item));
    assert!(check(Predicate::lt("score", 3), &item));
    assert!(!check(Predicate::eq("score", 2), &item));
}

#[test]
fn test_integer_column_with_float_literal() {
    let item = person(1, Some(10));
    assert!(check(Predicate::eq("age", 10.0), &item));
    assert!(check(Predicate::lt("age", 10.5), &item));
}

#[test]
fn test_nan_only_matches_ne() {
    let mut item = person(1, None);
    item.insert("score".into(), Value::Float(f64::NAN));

    assert!(!check(Predicate::eq("score", f64::NAN), &item));
    assert!(!check(Predicate::gte("score", 0.0), &item));
    assert!(!check(Predicate::lt("score", 0.0), &item));
    assert!(check(Predicate::ne("score", 0.0), &item));
}

#[test]
fn test_boolean_equality() {
    let mut item = person(1, None);
    item.insert("admin".into(), Value::Boolean(true));

    assert!(check(Predicate::eq("admin", true), &item));
    assert!(check(Predicate::ne("admin", false), &item));
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_unknown_column() {
    let predicate = Predicate::and(vec![Predicate::eq("id", 1), Predicate::eq("height", 2)]);
    let result = evaluate(&predicate, &schema(), &person(1, None));
    assert!(matches!(result, Err(RowLogError::UnknownColumn(ref c)) if c == "height"));
}

#[test]
fn test_literal_type_mismatch() {
    let result = evaluate(&Predicate::eq("name", 3), &schema(), &person(1, None));
    assert!(matches!(
        result,
        Err(RowLogError::TypeMismatch {
            expected: ColumnType::Text,
            found: ColumnType::Integer,
            ..
        })
    ));

    let result = evaluate(&Predicate::eq("age", "ten"), &schema(), &person(1, None));
    assert!(matches!(result, Err(RowLogError::TypeMismatch { .. })));
}

#[test]
fn test_ordering_on_boolean_is_unsupported() {
    let result = evaluate(&Predicate::gt("admin", false), &schema(), &person(1, None));
    assert!(matches!(
        result,
        Err(RowLogError::UnsupportedOperator {
            operator: Operator::Gt,
            ..
        })
    ));
}

#[test]
fn test_invalid_branch_fails_even_if_never_reached() {
    // Or short-circuits at evaluation, but validation covers every branch
    let predicate = Predicate::or(vec![Predicate::eq("id", 1), Predicate::eq("nope", 1)]);
    assert!(CompiledFilter::compile(&predicate, &schema()).is_err());
}

// =============================================================================
// JSON Tests
// =============================================================================

#[test]
fn test_predicate_from_json() {
    let json = r#"{"$or":[
        {"column":"id","op":"$eq","value":1},
        {"$and":[
            {"column":"id","op":"$gt","value":1},
            {"column":"id","op":"$lte","value":2}
        ]}
    ]}"#;
    let parsed: Predicate = serde_json::from_str(json).unwrap();
    let built = Predicate::or(vec![
        Predicate::eq("id", 1),
        Predicate::and(vec![Predicate::gt("id", 1), Predicate::lte("id", 2)]),
    ]);
    assert_eq!(parsed, built);
}
