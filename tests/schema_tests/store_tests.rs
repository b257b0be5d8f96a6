//! Tests for the Schema Store
//!
//! These tests verify:
//! - Saved descriptors load back as the same schema
//! - A second save for the same table is refused
//! - Structural validation of schemas
//! - Damaged descriptor files are reported as corrupt

use std::fs;

use rowlog::schema::{validate_schema, SchemaStore};
use rowlog::{ColumnDef, ColumnType, RowLogError, TableSchema};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn books_schema() -> TableSchema {
    TableSchema::new(
        "books",
        vec![
            ColumnDef::new("isbn", ColumnType::Text),
            ColumnDef::new("title", ColumnType::Text),
            ColumnDef::new("pages", ColumnType::Integer),
            ColumnDef::new("rating", ColumnType::Float),
            ColumnDef::new("in_print", ColumnType::Boolean),
        ],
        "isbn",
    )
}

fn assert_invalid(schema: TableSchema) {
    match validate_schema(&schema) {
        Err(RowLogError::InvalidSchema(_)) => {}
        other => panic!("expected InvalidSchema, got {:?}", other),
    }
}

// =============================================================================
// Save / Load Tests
// =============================================================================

#[test]
fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("schema.rls");

    SchemaStore::save(&path, &books_schema()).unwrap();
    let loaded = SchemaStore::load(&path, "books").unwrap();

    assert_eq!(loaded, books_schema());
    assert_eq!(loaded.primary_key_column().unwrap().column_type, ColumnType::Text);
}

#[test]
fn test_column_order_is_preserved() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("schema.rls");
    SchemaStore::save(&path, &books_schema()).unwrap();

    let names: Vec<String> = SchemaStore::load(&path, "books")
        .unwrap()
        .columns
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["isbn", "title", "pages", "rating", "in_print"]);
}

#[test]
fn test_second_save_is_refused() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("schema.rls");
    SchemaStore::save(&path, &books_schema()).unwrap();

    let result = SchemaStore::save(&path, &books_schema());
    assert!(matches!(result, Err(RowLogError::TableAlreadyExists(ref t)) if t == "books"));
}

#[test]
fn test_save_leaves_no_temp_file() {
    let dir = TempDir::new().unwrap();
    SchemaStore::save(&dir.path().join("schema.rls"), &books_schema()).unwrap();

    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = SchemaStore::load(&dir.path().join("schema.rls"), "books");
    assert!(matches!(result, Err(RowLogError::Io(_))));
}

#[test]
fn test_load_damaged_file_is_corrupt() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("schema.rls");
    SchemaStore::save(&path, &books_schema()).unwrap();

    let mut bytes = fs::read(&path).unwrap();
    bytes[8] ^= 0xFF;
    fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        SchemaStore::load(&path, "books"),
        Err(RowLogError::CorruptSchema(_))
    ));
}

#[test]
fn test_load_truncated_file_is_corrupt() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("schema.rls");
    SchemaStore::save(&path, &books_schema()).unwrap();

    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..5]).unwrap();

    assert!(matches!(
        SchemaStore::load(&path, "books"),
        Err(RowLogError::CorruptSchema(_))
    ));
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_valid_schema_passes() {
    validate_schema(&books_schema()).unwrap();
}

#[test]
fn test_primary_key_not_a_column() {
    let mut schema = books_schema();
    schema.primary_key = "id".into();
    assert_invalid(schema);
}

#[test]
fn test_duplicate_column_names() {
    let mut schema = books_schema();
    schema.columns.push(ColumnDef::new("title", ColumnType::Integer));
    assert_invalid(schema);
}

#[test]
fn test_no_columns() {
    assert_invalid(TableSchema::new("empty", vec![], "id"));
}

#[test]
fn test_bad_table_names() {
    for name in ["", "../escape", "with space", "a/b"] {
        let mut schema = books_schema();
        schema.name = name.into();
        assert_invalid(schema);
    }
}

#[test]
fn test_empty_column_name() {
    let mut schema = books_schema();
    schema.columns.push(ColumnDef::new("", ColumnType::Boolean));
    assert_invalid(schema);
}

#[test]
fn test_save_rejects_invalid_schema() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("schema.rls");
    let mut schema = books_schema();
    schema.primary_key = "missing".into();

    assert!(matches!(
        SchemaStore::save(&path, &schema),
        Err(RowLogError::InvalidSchema(_))
    ));
    assert!(!path.exists());
}
