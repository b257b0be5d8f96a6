//! # RowLog
//!
//! A minimal single-node table store with:
//! - One append-only data file per table
//! - Variable-length typed records with a presence bitmap
//! - An in-memory primary-key index rebuilt from the log on startup
//! - Predicate-tree filters evaluated by full scans
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Request Layer (CLI, ...)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ typed calls
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Engine                                 │
//! │              (table name → Table registry)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Table                                  │
//! │            (Single Writer / Multi Reader)                    │
//! └──────┬──────────────┬───────────────┬──────────────┬────────┘
//!        │              │               │              │
//!        ▼              ▼               ▼              ▼
//!  ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌──────────┐
//!  │  Schema   │  │  Record   │  │ Append Log │  │  PK      │
//!  │  Store    │  │  Codec    │  │ (data.log) │  │  Index   │
//!  └───────────┘  └───────────┘  └────────────┘  └──────────┘
//!                                                      ▲
//!                     Filter Evaluator ── scans ───────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use rowlog::{ColumnDef, ColumnType, Engine, Item, Predicate, TableSchema, Value};
//!
//! # fn main() -> rowlog::Result<()> {
//! let engine = Engine::open_path(std::path::Path::new("./rowlog_data"))?;
//! engine.create_table(TableSchema::new(
//!     "authors",
//!     vec![
//!         ColumnDef::new("id", ColumnType::Integer),
//!         ColumnDef::new("name", ColumnType::Text),
//!     ],
//!     "id",
//! ))?;
//!
//! let mut item = Item::new();
//! item.insert("id".into(), Value::Integer(1));
//! item.insert("name".into(), Value::from("Ursula"));
//! engine.put_item("authors", &item)?;
//!
//! assert_eq!(engine.get_item("authors", &Value::Integer(1))?, item);
//! let found = engine.filter_item("authors", &Predicate::gte("id", 1))?;
//! assert_eq!(found.len(), 1);
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod types;

pub mod record;
pub mod schema;
pub mod log;
pub mod index;
pub mod filter;
pub mod table;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{RowLogError, Result};
pub use config::{Config, SyncStrategy};
pub use engine::Engine;
pub use filter::{Comparison, Operator, Predicate};
pub use table::{CompactionReport, Table, TableStats};
pub use types::{ColumnDef, ColumnType, Item, TableSchema, Value};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of RowLog
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
