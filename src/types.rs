//! Shared primitive aliases and constants.

/// Zero-based ordinal of a closed record, counted per parser instance.
pub type RecordNo = u64;
/// Byte offset into the text handed to a parser.
pub type ByteOffset = usize;
/// Identifier of an import job owned by the async runtime.
pub type JobId = u64;

/// Value stored for integer fields that could not be parsed.
pub const INT_SENTINEL: i64 = -1;

/// Reserved field name closing a QSO record.
pub const END_OF_RECORD: &str = "eor";
/// Reserved field name closing the file header.
pub const END_OF_HEADER: &str = "eoh";
