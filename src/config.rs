//! Configuration for RowLog
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a RowLog instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory holding one sub-directory per table
    /// Internal structure:
    ///   {data_dir}/
    ///     └── {table}/
    ///           ├── schema.rls   (schema descriptor)
    ///           └── data.log     (append-only records)
    pub data_dir: PathBuf,

    /// Create `data_dir` on open when it does not exist
    pub create_if_missing: bool,

    // -------------------------------------------------------------------------
    // Log Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync table logs
    pub sync_strategy: SyncStrategy,
}

/// Log sync strategy
///
/// None of these is a durability guarantee; they only bound how much
/// unsynced data a crash can lose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// Leave flushing to the operating system
    Never,

    /// fsync after every append (safest, slowest)
    EveryWrite,

    /// fsync after N appends
    EveryNEntries { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./rowlog_data"),
            create_if_missing: true,
            sync_strategy: SyncStrategy::EveryNEntries { count: 100 },
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all tables)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Whether a missing data directory is created on open
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.config.create_if_missing = create;
        self
    }

    /// Set the log sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
