//! Append Log
//!
//! Single-file, append-only record storage for one table.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::error;

use crate::config::SyncStrategy;
use crate::error::{Result, RowLogError};
use crate::record::LENGTH_PREFIX_SIZE;

use super::{LogRecovery, LogScanner, RecoveryReport};

/// Append-only log file
///
/// ## Concurrency:
/// - `writer`: Mutex, appends are serialized
/// - `committed_len`: published after each complete append; readers open
///   their own file handles and never read past it
pub struct AppendLog {
    /// Path of the data file
    path: PathBuf,

    /// Write handle plus sync bookkeeping
    writer: Mutex<LogWriter>,

    /// End of the last fully written record
    committed_len: AtomicU64,
}

struct LogWriter {
    file: File,
    sync_strategy: SyncStrategy,
    /// Appends since the last fsync
    unsynced: usize,
    /// Set when a failed append could not be rolled back; the file end no
    /// longer matches `committed_len`
    failed: bool,
}

impl LogWriter {
    fn after_append(&mut self) -> std::io::Result<()> {
        self.unsynced += 1;
        let due = match self.sync_strategy {
            SyncStrategy::Never => false,
            SyncStrategy::EveryWrite => true,
            SyncStrategy::EveryNEntries { count } => self.unsynced >= count.max(1),
        };
        if due {
            self.sync()?;
        }
        Ok(())
    }

    fn sync(&mut self) -> std::io::Result<()> {
        self.file.sync_data()?;
        self.unsynced = 0;
        Ok(())
    }
}

impl AppendLog {
    /// Open or create a log file, discarding any partial trailing record
    pub fn open(path: &Path, sync_strategy: SyncStrategy) -> Result<(Self, RecoveryReport)> {
        let file = Self::open_writer(path)?;
        let report = LogRecovery::recover(path)?;

        let log = Self {
            path: path.to_path_buf(),
            writer: Mutex::new(LogWriter {
                file,
                sync_strategy,
                unsynced: 0,
                failed: false,
            }),
            committed_len: AtomicU64::new(report.valid_len),
        };
        Ok((log, report))
    }

    fn open_writer(path: &Path) -> Result<File> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(file)
    }

    /// Append one encoded record; returns the offset where it starts
    ///
    /// On failure the file is cut back to its previous length and the
    /// committed length is unchanged. If that cut fails too, the log refuses
    /// every further append until it is reopened.
    pub fn append(&self, record: &[u8]) -> Result<u64> {
        let mut writer = self.writer.lock();
        if writer.failed {
            return Err(RowLogError::Io(io::Error::new(
                io::ErrorKind::Other,
                format!(
                    "log {} is unusable after a failed rollback",
                    self.path.display()
                ),
            )));
        }
        let offset = self.committed_len.load(Ordering::Acquire);

        let written = writer
            .file
            .write_all(record)
            .and_then(|_| writer.after_append());
        if let Err(e) = written {
            if let Err(rollback) = writer.file.set_len(offset) {
                writer.failed = true;
                error!(
                    path = %self.path.display(),
                    offset,
                    error = %rollback,
                    "Failed to roll back partial append; log disabled"
                );
            }
            return Err(RowLogError::Io(e));
        }

        self.committed_len
            .store(offset + record.len() as u64, Ordering::Release);
        Ok(offset)
    }

    /// Read the record starting at `offset`
    pub fn read_at(&self, offset: u64) -> Result<Vec<u8>> {
        let limit = self.len();
        let prefix_end = offset + LENGTH_PREFIX_SIZE as u64;
        if prefix_end > limit {
            return Err(RowLogError::CorruptRecord(format!(
                "offset {} is past end of log ({} bytes)",
                offset, limit
            )));
        }

        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(offset))?;

        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        file.read_exact(&mut prefix)?;
        let body_len = u32::from_le_bytes(prefix) as u64;
        if prefix_end + body_len > limit {
            return Err(RowLogError::CorruptRecord(format!(
                "record at {} with length {} reads past end of log ({} bytes)",
                offset, body_len, limit
            )));
        }

        let mut record = vec![0u8; LENGTH_PREFIX_SIZE + body_len as usize];
        record[..LENGTH_PREFIX_SIZE].copy_from_slice(&prefix);
        file.read_exact(&mut record[LENGTH_PREFIX_SIZE..])?;
        Ok(record)
    }

    /// Lazily scan every record from `offset` to the current committed length
    pub fn scan_from(&self, offset: u64) -> Result<LogScanner> {
        LogScanner::open(&self.path, offset, self.len())
    }

    /// Lazily scan the records in `[from, to)`
    ///
    /// `to` is clamped to the committed length; pass a length captured
    /// earlier to scan a snapshot.
    pub fn scan_range(&self, from: u64, to: u64) -> Result<LogScanner> {
        LogScanner::open(&self.path, from, to.min(self.len()))
    }

    /// Committed length in bytes (snapshot)
    pub fn len(&self) -> u64 {
        self.committed_len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Force buffered appends to stable storage
    pub fn sync(&self) -> Result<()> {
        self.writer.lock().sync()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomically replace the log with the file at `replacement`
    ///
    /// The caller must guarantee that no reader holds an offset into the
    /// old file; offsets are not preserved.
    pub(crate) fn replace_with(&self, replacement: &Path) -> Result<()> {
        let mut writer = self.writer.lock();

        fs::rename(replacement, &self.path)?;
        let file = Self::open_writer(&self.path)?;
        let new_len = file.metadata()?.len();

        writer.file = file;
        writer.unsynced = 0;
        writer.failed = false;
        self.committed_len.store(new_len, Ordering::Release);
        Ok(())
    }
}
