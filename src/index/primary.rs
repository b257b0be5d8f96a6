//! Primary-key index implementation
//!
//! HashMap-based; callers provide locking.

use std::collections::HashMap;

use crate::error::Result;
use crate::log::AppendLog;
use crate::record::RecordCodec;

/// Primary key → offset of its latest record
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PrimaryKeyIndex {
    entries: HashMap<Vec<u8>, u64>,
}

impl PrimaryKeyIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with a full replay of `log`
    ///
    /// Only the key field of each record is decoded. Later records win.
    /// Returns the number of records replayed.
    pub fn rebuild(&mut self, log: &AppendLog, codec: &RecordCodec) -> Result<u64> {
        self.entries.clear();

        let mut replayed = 0;
        for entry in log.scan_from(0)? {
            let (offset, record) = entry?;
            let key = codec.decode_key(&record)?;
            self.entries.insert(key, offset);
            replayed += 1;
        }
        Ok(replayed)
    }

    /// Point `key` at `offset`, overwriting any earlier entry
    pub fn put(&mut self, key: Vec<u8>, offset: u64) {
        self.entries.insert(key, offset);
    }

    /// Latest offset for `key`, if any
    pub fn get(&self, key: &[u8]) -> Option<u64> {
        self.entries.get(key).copied()
    }

    /// Whether `offset` is the latest record for `key`
    pub fn is_current(&self, key: &[u8], offset: u64) -> bool {
        self.get(key) == Some(offset)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over (key, offset) pairs in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], u64)> {
        self.entries.iter().map(|(k, v)| (k.as_slice(), *v))
    }

    /// Every current offset, ascending (file order)
    pub fn live_offsets(&self) -> Vec<u64> {
        let mut offsets: Vec<u64> = self.entries.values().copied().collect();
        offsets.sort_unstable();
        offsets
    }
}
