//! Primary-Key Index Module
//!
//! In-memory map from encoded primary-key bytes to the offset of the
//! latest record for that key.
//!
//! ## Responsibilities
//! - O(1) expected lookups for `get_item`
//! - "Is this offset still current?" checks during filter scans
//! - Reconstruction from the append log at open time
//!
//! The index is never persisted; the log is the single source of truth.

mod primary;

pub use primary::PrimaryKeyIndex;
