//! Record Module
//!
//! Schema-driven binary encoding of items.
//!
//! ## Responsibilities
//! - Encode an `Item` into one length-prefixed record
//! - Decode a record back into an `Item`
//! - Extract only the primary-key bytes of a record (index rebuild, scans)
//!
//! ## Record Format
//! ```text
//! ┌──────────────┬────────────────────┬─────────┬─────┬─────────────┐
//! │ TotalLen (4) │ Presence (⌈n/8⌉)   │ Field 0 │ ... │ Field n-1   │
//! └──────────────┴────────────────────┴─────────┴─────┴─────────────┘
//! ```
//!
//! `TotalLen` counts every byte after itself. Bit `i` of the presence bitmap
//! (byte `i / 8`, bit `i % 8`) marks column `i` as present; absent columns
//! contribute no bytes. All integers are little-endian.
//!
//! | Type    | Encoding                    |
//! |---------|-----------------------------|
//! | Integer | 8 bytes, two's complement   |
//! | Float   | 8 bytes, IEEE-754 binary64  |
//! | Boolean | 1 byte, 0 or 1              |
//! | Text    | Len (4) + UTF-8 bytes       |

mod codec;

pub use codec::RecordCodec;

/// Size of the `TotalLen` prefix at the start of every record
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Largest body a record may carry (it must fit the u32 prefix)
pub const MAX_RECORD_BODY: usize = u32::MAX as usize;
