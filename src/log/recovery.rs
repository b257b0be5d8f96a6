//! Log Recovery
//!
//! Finds the end of the last well-formed record after a crash.

use std::fs::{File, OpenOptions};
use std::path::Path;

use crate::error::Result;

use super::LogScanner;

/// Handles log recovery after crash
pub struct LogRecovery;

/// Result of a recovery operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Number of well-formed records found
    pub records: u64,

    /// Length of the file up to the end of the last well-formed record
    pub valid_len: u64,

    /// Bytes of partial trailing record (discarded by `recover`)
    pub truncated_bytes: u64,
}

impl RecoveryReport {
    /// Whether a partial trailing record was found
    pub fn was_truncated(&self) -> bool {
        self.truncated_bytes > 0
    }
}

impl LogRecovery {
    /// Recover a log file in place
    ///
    /// A partial trailing record is cut off so the next append starts on a
    /// record boundary. Nothing before it is touched.
    pub fn recover(path: &Path) -> Result<RecoveryReport> {
        let report = Self::verify(path)?;
        if report.was_truncated() {
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(report.valid_len)?;
            file.sync_all()?;
            tracing::warn!(
                path = %path.display(),
                discarded = report.truncated_bytes,
                "Discarded partial trailing record"
            );
        }
        Ok(report)
    }

    /// Inspect a log file without modifying it
    pub fn verify(path: &Path) -> Result<RecoveryReport> {
        let file_len = File::open(path)?.metadata()?.len();

        let mut scanner = LogScanner::open(path, 0, file_len)?;
        let mut records = 0;
        for entry in scanner.by_ref() {
            entry?;
            records += 1;
        }

        let valid_len = scanner.position();
        Ok(RecoveryReport {
            records,
            valid_len,
            truncated_bytes: file_len - valid_len,
        })
    }
}
