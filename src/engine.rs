//! Engine Module
//!
//! The process-wide table registry and the boundary operations.
//!
//! ## Responsibilities
//! - Discover and recover every table under the data directory on startup
//! - Route item operations to the owning table
//! - Create new tables
//! - Maintenance: stats, compaction, sync

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Result, RowLogError};
use crate::filter::Predicate;
use crate::schema::validate_schema;
use crate::table::{CompactionReport, Table, TableStats};
use crate::types::{Item, TableSchema, Value};

/// The main storage engine
///
/// ## Concurrency Model
///
/// - `tables`: RwLock, written only by `create_table`; every other
///   operation takes a read lock just long enough to clone the `Arc<Table>`
/// - Each `Table` coordinates its own readers and writer, so operations on
///   different tables never wait for each other
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Table name → table
    tables: RwLock<HashMap<String, Arc<Table>>>,
}

impl Engine {
    /// Open an engine over `config.data_dir`
    ///
    /// On startup:
    /// 1. Create data directory if allowed and missing
    /// 2. Open every table directory found (schema + log)
    /// 3. Rebuild each table's index from its log
    /// 4. Ready to serve requests
    pub fn open(config: Config) -> Result<Self> {
        // Step 1: Data directory
        if !config.data_dir.exists() {
            if !config.create_if_missing {
                return Err(RowLogError::Config(format!(
                    "data directory '{}' does not exist",
                    config.data_dir.display()
                )));
            }
            fs::create_dir_all(&config.data_dir)?;
        }

        // Step 2 + 3: Discover and recover tables
        let mut tables = HashMap::new();
        for entry in fs::read_dir(&config.data_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string)
            else {
                warn!(path = %path.display(), "Skipping directory with non UTF-8 name");
                continue;
            };
            if !path.join(Table::SCHEMA_FILENAME).exists() {
                warn!(table = %name, "Skipping directory without schema descriptor");
                continue;
            }

            let table = Table::open(&path, &name, config.sync_strategy)?;
            tables.insert(name, Arc::new(table));
        }

        info!(
            data_dir = %config.data_dir.display(),
            tables = tables.len(),
            "Engine opened"
        );

        Ok(Self {
            config,
            tables: RwLock::new(tables),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    // =========================================================================
    // Boundary Operations
    // =========================================================================

    /// Create a table: persist its schema, open an empty log and index
    pub fn create_table(&self, schema: TableSchema) -> Result<()> {
        validate_schema(&schema)?;

        let mut tables = self.tables.write();
        if tables.contains_key(&schema.name) {
            return Err(RowLogError::TableAlreadyExists(schema.name));
        }

        let name = schema.name.clone();
        let table = Table::create(&self.table_dir(&name), schema, self.config.sync_strategy)?;
        tables.insert(name, Arc::new(table));
        Ok(())
    }

    /// Write an item to a table (upsert on its primary key)
    pub fn put_item(&self, table: &str, item: &Item) -> Result<()> {
        self.table(table)?.put_item(item)
    }

    /// Read the current item for a primary-key value
    pub fn get_item(&self, table: &str, key: &Value) -> Result<Item> {
        self.table(table)?.get_item(key)
    }

    /// All current items of a table that satisfy `predicate`
    pub fn filter_item(&self, table: &str, predicate: &Predicate) -> Result<Vec<Item>> {
        self.table(table)?.filter_item(predicate)
    }

    // =========================================================================
    // Catalog & Maintenance
    // =========================================================================

    /// Names of all tables, sorted
    pub fn list_tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Schema of a table
    pub fn schema(&self, table: &str) -> Result<TableSchema> {
        Ok(self.table(table)?.schema().clone())
    }

    /// Key count and log size of a table
    pub fn table_stats(&self, table: &str) -> Result<TableStats> {
        Ok(self.table(table)?.stats())
    }

    /// Drop superseded records from a table's log
    pub fn compact_table(&self, table: &str) -> Result<CompactionReport> {
        self.table(table)?.compact()
    }

    /// fsync every table log
    pub fn sync(&self) -> Result<()> {
        let tables: Vec<Arc<Table>> = self.tables.read().values().cloned().collect();
        for table in tables {
            table.sync()?;
        }
        Ok(())
    }

    /// Close the engine gracefully
    ///
    /// Syncs all logs to disk
    pub fn close(self) -> Result<()> {
        self.sync()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Look up an open table
    pub fn table(&self, name: &str) -> Result<Arc<Table>> {
        self.tables
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| RowLogError::TableNotFound(name.to_string()))
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn table_dir(&self, name: &str) -> PathBuf {
        self.config.data_dir.join(name)
    }
}
