//! Table Module
//!
//! One table: schema, append log and primary-key index.
//!
//! ## Responsibilities
//! - Create the on-disk layout of a new table
//! - Recover the index from the log on open
//! - Serialize writes; let reads run concurrently
//! - Offline compaction of the log

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::config::SyncStrategy;
use crate::error::{Result, RowLogError};
use crate::filter::{CompiledFilter, Predicate};
use crate::index::PrimaryKeyIndex;
use crate::log::AppendLog;
use crate::record::RecordCodec;
use crate::schema::{validate_schema, SchemaStore};
use crate::types::{Item, TableSchema, Value};

/// Size figures for one table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableStats {
    /// Distinct primary keys
    pub live_keys: usize,
    /// Committed log length in bytes, superseded records included
    pub log_bytes: u64,
}

/// Outcome of a compaction pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactionReport {
    /// Current records copied into the new log
    pub records_kept: usize,
    pub bytes_before: u64,
    pub bytes_after: u64,
}

/// A single table
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// - **Writes** (put): serialized by `write_lock`
///   - Must acquire: write_lock → log append → index (write)
///   - The index is updated only after the append succeeded
///
/// - **Point reads** (get): hold `index` for reading across one `read_at`
///
/// - **Scans** (filter): hold `scan_lock` for reading; copy the index and
///   the committed log length under a short `index` read, then scan with no
///   index lock held
///   - A pending writer never makes a `get` wait for a running scan
///   - The pair (index, committed log length) a scan sees is consistent
///
/// - **Compaction**: write_lock → scan_lock (write) → index (write);
///   excludes everything
pub struct Table {
    /// Table definition (immutable after open)
    schema: TableSchema,

    /// Encode/decode plan derived from `schema`
    codec: RecordCodec,

    /// Directory holding the schema descriptor and the log
    dir: PathBuf,

    /// Data file
    log: AppendLog,

    /// Primary key → latest offset
    index: RwLock<PrimaryKeyIndex>,

    /// Serializes append + index update
    write_lock: Mutex<()>,

    /// Shared by running scans, exclusive for compaction
    scan_lock: RwLock<()>,
}

impl Table {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    pub const SCHEMA_FILENAME: &'static str = "schema.rls";
    pub const LOG_FILENAME: &'static str = "data.log";
    const COMPACT_FILENAME: &'static str = "data.log.compact";

    /// Create a new table in `dir`
    ///
    /// A directory without a schema descriptor (left by a create that never
    /// finished) is reused; its old log is discarded.
    pub fn create(dir: &Path, schema: TableSchema, sync_strategy: SyncStrategy) -> Result<Self> {
        validate_schema(&schema)?;

        match fs::create_dir(dir) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if dir.join(Self::SCHEMA_FILENAME).exists() {
                    return Err(RowLogError::TableAlreadyExists(schema.name));
                }
                Self::clear_leftovers(dir)?;
                warn!(table = %schema.name, "Reusing table directory without schema descriptor");
            }
            Err(e) => return Err(e.into()),
        }

        let created = Self::initialize(dir, schema, sync_strategy);
        if created.is_err() {
            // Leave no half-created table for the next open to trip over
            let _ = fs::remove_dir_all(dir);
        }
        created
    }

    fn clear_leftovers(dir: &Path) -> Result<()> {
        for leftover in [Self::LOG_FILENAME, Self::COMPACT_FILENAME] {
            match fs::remove_file(dir.join(leftover)) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn initialize(dir: &Path, schema: TableSchema, sync_strategy: SyncStrategy) -> Result<Self> {
        let codec = RecordCodec::new(&schema)?;
        SchemaStore::save(&dir.join(Self::SCHEMA_FILENAME), &schema)?;
        let (log, _) = AppendLog::open(&dir.join(Self::LOG_FILENAME), sync_strategy)?;

        info!(table = %schema.name, columns = schema.columns.len(), "Created table");

        Ok(Self {
            schema,
            codec,
            dir: dir.to_path_buf(),
            log,
            index: RwLock::new(PrimaryKeyIndex::new()),
            write_lock: Mutex::new(()),
            scan_lock: RwLock::new(()),
        })
    }

    /// Open an existing table and rebuild its index from the log
    ///
    /// The table is unusable until this returns.
    pub fn open(dir: &Path, name: &str, sync_strategy: SyncStrategy) -> Result<Self> {
        let schema = SchemaStore::load(&dir.join(Self::SCHEMA_FILENAME), name)?;
        let codec = RecordCodec::new(&schema)?;

        // Left behind by a compaction that never reached its rename
        let stale = dir.join(Self::COMPACT_FILENAME);
        if stale.exists() {
            fs::remove_file(&stale)?;
        }

        let (log, recovery) = AppendLog::open(&dir.join(Self::LOG_FILENAME), sync_strategy)?;

        let mut index = PrimaryKeyIndex::new();
        let replayed = index.rebuild(&log, &codec)?;

        debug!(
            table = name,
            records = replayed,
            live_keys = index.len(),
            log_bytes = log.len(),
            discarded_bytes = recovery.truncated_bytes,
            "Recovered table"
        );

        Ok(Self {
            schema,
            codec,
            dir: dir.to_path_buf(),
            log,
            index: RwLock::new(index),
            write_lock: Mutex::new(()),
            scan_lock: RwLock::new(()),
        })
    }

    // =========================================================================
    // Item Operations
    // =========================================================================

    /// Write an item (upsert)
    ///
    /// Steps:
    /// 1. Encode (all validation happens here, before any I/O)
    /// 2. Acquire write lock
    /// 3. Append to log
    /// 4. Point the index at the new record
    pub fn put_item(&self, item: &Item) -> Result<()> {
        let record = self.codec.encode(item)?;
        let key = self.codec.decode_key(&record)?;

        let _write_guard = self.write_lock.lock();
        let offset = self.log.append(&record)?;
        self.index.write().put(key, offset);
        Ok(())
    }

    /// Read the current item for a primary-key value
    pub fn get_item(&self, key: &Value) -> Result<Item> {
        let key = self.codec.encode_key(key)?;

        let record = {
            let index = self.index.read();
            let offset = index.get(&key).ok_or(RowLogError::KeyNotFound)?;
            self.log.read_at(offset)?
        };
        self.codec.decode(&record)
    }

    /// Every current item matching `predicate`, in file order
    ///
    /// Runs against a snapshot taken when the call starts: superseded
    /// records are skipped by asking the copied index whether each record's
    /// offset is still the latest for its key, and later appends are not
    /// scanned. Writers and point reads proceed while the scan runs.
    pub fn filter_item(&self, predicate: &Predicate) -> Result<Vec<Item>> {
        let filter = CompiledFilter::compile(predicate, &self.schema)?;

        let _scan_guard = self.scan_lock.read();
        let (index, limit) = {
            let index = self.index.read();
            (index.clone(), self.log.len())
        };

        let mut matches = Vec::new();
        for entry in self.log.scan_range(0, limit)? {
            let (offset, record) = entry?;
            let key = self.codec.decode_key(&record)?;
            if !index.is_current(&key, offset) {
                continue;
            }
            let item = self.codec.decode(&record)?;
            if filter.matches(&item) {
                matches.push(item);
            }
        }
        Ok(matches)
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Rewrite the log keeping only the current record of every key
    ///
    /// Records keep their relative file order. Readers and writers are
    /// excluded for the duration.
    pub fn compact(&self) -> Result<CompactionReport> {
        let _write_guard = self.write_lock.lock();
        let _scan_guard = self.scan_lock.write();
        let mut index = self.index.write();

        let bytes_before = self.log.len();
        let compact_path = self.dir.join(Self::COMPACT_FILENAME);

        let mut compacted = PrimaryKeyIndex::new();
        let mut position = 0u64;
        {
            let mut writer = BufWriter::new(File::create(&compact_path)?);
            for offset in index.live_offsets() {
                let record = self.log.read_at(offset)?;
                let key = self.codec.decode_key(&record)?;
                writer.write_all(&record)?;
                compacted.put(key, position);
                position += record.len() as u64;
            }
            let file = writer.into_inner().map_err(|e| RowLogError::Io(e.into_error()))?;
            file.sync_all()?;
        }

        self.log.replace_with(&compact_path)?;
        let records_kept = compacted.len();
        *index = compacted;

        let report = CompactionReport {
            records_kept,
            bytes_before,
            bytes_after: self.log.len(),
        };
        info!(
            table = %self.schema.name,
            records_kept,
            bytes_before,
            bytes_after = report.bytes_after,
            "Compacted table"
        );
        Ok(report)
    }

    /// fsync the log
    pub fn sync(&self) -> Result<()> {
        self.log.sync()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn stats(&self) -> TableStats {
        let index = self.index.read();
        TableStats {
            live_keys: index.len(),
            log_bytes: self.log.len(),
        }
    }

    /// Snapshot of the index (for testing and debugging)
    pub fn index_snapshot(&self) -> PrimaryKeyIndex {
        self.index.read().clone()
    }

    /// The underlying log (for testing and debugging)
    pub fn log(&self) -> &AppendLog {
        &self.log
    }
}
