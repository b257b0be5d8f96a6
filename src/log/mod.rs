//! Append Log Module
//!
//! The one mutable on-disk structure of a table.
//!
//! ## Responsibilities
//! - Append encoded records and hand back their byte offsets
//! - Random reads of one record by offset
//! - Lazy forward scans from any record boundary
//! - Discard a partial trailing record left by a crash
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────┐  offset 0
//! │ Record 1 (TotalLen + body)   │
//! ├──────────────────────────────┤  offset 4 + len(1)
//! │ Record 2                     │
//! ├──────────────────────────────┤
//! │ ...                          │
//! └──────────────────────────────┘  committed length
//! ```
//!
//! No header or footer. Bytes are never rewritten in place; only
//! compaction replaces the file as a whole.
//!
//! ## Snapshots
//! The committed length is published after a record is fully written.
//! Readers capture it once and never look past it, so a record that is
//! still being appended is invisible to them.

mod append_log;
mod recovery;
mod scanner;

pub use append_log::AppendLog;
pub use recovery::{LogRecovery, RecoveryReport};
pub use scanner::LogScanner;
