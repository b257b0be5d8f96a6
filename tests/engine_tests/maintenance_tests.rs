//! Tests for table maintenance
//!
//! These tests verify:
//! - Stats track keys and log size
//! - Compaction drops superseded records and preserves every current item
//! - A compacted table reopens cleanly

use rowlog::{ColumnDef, ColumnType, Engine, Item, Predicate, RowLogError, TableSchema, Value};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn counters_schema() -> TableSchema {
    TableSchema::new(
        "counters",
        vec![
            ColumnDef::new("name", ColumnType::Text),
            ColumnDef::new("count", ColumnType::Integer),
        ],
        "name",
    )
}

fn counter(name: &str, count: i64) -> Item {
    let mut item = Item::new();
    item.insert("name".into(), Value::from(name));
    item.insert("count".into(), Value::Integer(count));
    item
}

fn all(engine: &Engine) -> Vec<Item> {
    engine
        .filter_item("counters", &Predicate::and(vec![]))
        .unwrap()
}

// =============================================================================
// Stats Tests
// =============================================================================

#[test]
fn test_stats_of_new_table() {
    let dir = TempDir::new().unwrap();
    let engine = Engine::open_path(dir.path()).unwrap();
    engine.create_table(counters_schema()).unwrap();

    let stats = engine.table_stats("counters").unwrap();
    assert_eq!(stats.live_keys, 0);
    assert_eq!(stats.log_bytes, 0);
}

#[test]
fn test_stats_grow_with_writes() {
    let dir = TempDir::new().unwrap();
    let engine = Engine::open_path(dir.path()).unwrap();
    engine.create_table(counters_schema()).unwrap();

    engine.put_item("counters", &counter("a", 1)).unwrap();
    let after_one = engine.table_stats("counters").unwrap();
    engine.put_item("counters", &counter("a", 2)).unwrap();
    let after_two = engine.table_stats("counters").unwrap();

    assert_eq!(after_one.live_keys, 1);
    assert_eq!(after_two.live_keys, 1);
    assert_eq!(after_two.log_bytes, after_one.log_bytes * 2);
}

// =============================================================================
// Compaction Tests
// =============================================================================

#[test]
fn test_compact_drops_superseded_records() {
    let dir = TempDir::new().unwrap();
    let engine = Engine::open_path(dir.path()).unwrap();
    engine.create_table(counters_schema()).unwrap();

    for round in 0..10 {
        for name in ["a", "b", "c"] {
            engine.put_item("counters", &counter(name, round)).unwrap();
        }
    }
    let before = all(&engine);

    let report = engine.compact_table("counters").unwrap();
    assert_eq!(report.records_kept, 3);
    assert_eq!(report.bytes_after * 10, report.bytes_before);

    assert_eq!(all(&engine), before);
    let table = engine.table("counters").unwrap();
    assert_eq!(table.log().scan_from(0).unwrap().count(), 3);
    assert_eq!(
        engine.get_item("counters", &Value::from("b")).unwrap(),
        counter("b", 9)
    );
}

#[test]
fn test_writes_after_compaction() {
    let dir = TempDir::new().unwrap();
    let engine = Engine::open_path(dir.path()).unwrap();
    engine.create_table(counters_schema()).unwrap();
    engine.put_item("counters", &counter("a", 1)).unwrap();
    engine.put_item("counters", &counter("a", 2)).unwrap();
    engine.compact_table("counters").unwrap();

    engine.put_item("counters", &counter("a", 3)).unwrap();
    engine.put_item("counters", &counter("z", 1)).unwrap();

    assert_eq!(all(&engine), vec![counter("a", 3), counter("z", 1)]);
}

#[test]
fn test_compacted_table_reopens() {
    let dir = TempDir::new().unwrap();
    {
        let engine = Engine::open_path(dir.path()).unwrap();
        engine.create_table(counters_schema()).unwrap();
        engine.put_item("counters", &counter("x", 1)).unwrap();
        engine.put_item("counters", &counter("y", 1)).unwrap();
        engine.put_item("counters", &counter("x", 2)).unwrap();
        engine.compact_table("counters").unwrap();
        engine.close().unwrap();
    }

    let engine = Engine::open_path(dir.path()).unwrap();
    assert_eq!(all(&engine), vec![counter("y", 1), counter("x", 2)]);
    assert!(!dir.path().join("counters").join("data.log.compact").exists());
}

#[test]
fn test_compact_empty_table() {
    let dir = TempDir::new().unwrap();
    let engine = Engine::open_path(dir.path()).unwrap();
    engine.create_table(counters_schema()).unwrap();

    let report = engine.compact_table("counters").unwrap();
    assert_eq!(report.records_kept, 0);
    assert_eq!(report.bytes_after, 0);
}

#[test]
fn test_compact_unknown_table() {
    let dir = TempDir::new().unwrap();
    let engine = Engine::open_path(dir.path()).unwrap();

    assert!(matches!(
        engine.compact_table("counters"),
        Err(RowLogError::TableNotFound(_))
    ));
}
