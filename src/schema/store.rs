//! Schema persistence
//!
//! One descriptor file per table directory.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::error::{Result, RowLogError};
use crate::types::TableSchema;

use super::{decode_descriptor, encode_descriptor};

/// Reads and writes schema descriptor files
pub struct SchemaStore;

impl SchemaStore {
    /// Write the descriptor for a new table
    ///
    /// Fails with `TableAlreadyExists` if a descriptor is already present.
    /// The file is written under a temporary name and renamed into place, so
    /// a crash never leaves a half-written descriptor behind.
    pub fn save(path: &Path, schema: &TableSchema) -> Result<()> {
        if path.exists() {
            return Err(RowLogError::TableAlreadyExists(schema.name.clone()));
        }

        let bytes = encode_descriptor(schema)?;
        let tmp_path = path.with_extension("tmp");
        {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&tmp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, path)?;

        // Persist the rename itself (directories cannot be opened on Windows)
        #[cfg(unix)]
        if let Some(dir) = path.parent() {
            File::open(dir)?.sync_all()?;
        }
        Ok(())
    }

    /// Load the descriptor of table `name`
    pub fn load(path: &Path, name: &str) -> Result<TableSchema> {
        let bytes = fs::read(path)?;
        decode_descriptor(name, &bytes)
    }
}
