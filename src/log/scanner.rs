//! Log Scanner
//!
//! Sequential iteration over the records of a log file.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{Result, RowLogError};
use crate::record::LENGTH_PREFIX_SIZE;

/// Iterator over `(offset, record)` pairs in file order
///
/// Records are returned whole, length prefix included. Iteration stops
/// without error at `limit` or at a record that would extend past it.
pub struct LogScanner {
    reader: BufReader<File>,
    /// Offset of the next record
    position: u64,
    /// Snapshot of the readable length
    limit: u64,
    /// Set once a partial trailing record has been seen
    truncated_tail: bool,
    done: bool,
}

impl LogScanner {
    /// Open a scanner over `[from, limit)` of the file at `path`
    pub(crate) fn open(path: &Path, from: u64, limit: u64) -> Result<Self> {
        let mut file = File::open(path)?;
        file.seek(SeekFrom::Start(from))?;
        Ok(Self {
            reader: BufReader::new(file),
            position: from,
            limit,
            truncated_tail: false,
            done: from >= limit,
        })
    }

    /// Offset just past the last record yielded so far
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Whether the scan stopped at an incomplete record
    pub fn hit_truncated_tail(&self) -> bool {
        self.truncated_tail
    }

    fn read_next(&mut self) -> Result<Option<(u64, Vec<u8>)>> {
        let remaining = self.limit - self.position;
        if remaining < LENGTH_PREFIX_SIZE as u64 {
            self.truncated_tail = remaining > 0;
            return Ok(None);
        }

        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        self.reader.read_exact(&mut prefix)?;
        let body_len = u32::from_le_bytes(prefix) as u64;

        if LENGTH_PREFIX_SIZE as u64 + body_len > remaining {
            self.truncated_tail = true;
            return Ok(None);
        }

        let mut record = vec![0u8; LENGTH_PREFIX_SIZE + body_len as usize];
        record[..LENGTH_PREFIX_SIZE].copy_from_slice(&prefix);
        self.reader.read_exact(&mut record[LENGTH_PREFIX_SIZE..])?;

        let offset = self.position;
        self.position += record.len() as u64;
        Ok(Some((offset, record)))
    }
}

impl Iterator for LogScanner {
    type Item = Result<(u64, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_next() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(RowLogError::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                // File shrank under us; treat like a truncated tail
                self.done = true;
                self.truncated_tail = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
