//! Fatal parse errors.

use thiserror::Error;

use crate::types::RecordNo;

/// A strictly typed field could not be coerced.
///
/// Every variant names the field, the ordinal of the record being closed and
/// the offending raw text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// A `*_date` field is not an 8-digit `YYYYMMDD` calendar date.
    #[error("record {record}: field `{field}` is not a YYYYMMDD date: {value:?}")]
    InvalidDate {
        /// Field name.
        field: String,
        /// Record ordinal.
        record: RecordNo,
        /// Raw value.
        value: String,
    },

    /// The `freq` field is not a floating-point number.
    #[error("record {record}: field `{field}` is not a frequency: {value:?}")]
    InvalidFrequency {
        /// Field name.
        field: String,
        /// Record ordinal.
        record: RecordNo,
        /// Raw value.
        value: String,
        /// Underlying float parse failure.
        #[source]
        source: std::num::ParseFloatError,
    },

    /// A `time_*` field has a length that selects no time format.
    #[error("record {record}: field `{field}` has unsupported time length {len}: {value:?}")]
    UnsupportedTimeLength {
        /// Field name.
        field: String,
        /// Record ordinal.
        record: RecordNo,
        /// Length in characters.
        len: usize,
        /// Raw value.
        value: String,
    },

    /// A `time_*` field has the right length but is not a valid time.
    #[error("record {record}: field `{field}` is not a valid time: {value:?}")]
    InvalidTime {
        /// Field name.
        field: String,
        /// Record ordinal.
        record: RecordNo,
        /// Raw value.
        value: String,
    },
}

impl ParseError {
    /// Ordinal of the record that failed.
    pub fn record(&self) -> RecordNo {
        match self {
            Self::InvalidDate { record, .. }
            | Self::InvalidFrequency { record, .. }
            | Self::UnsupportedTimeLength { record, .. }
            | Self::InvalidTime { record, .. } => *record,
        }
    }

    /// Name of the field that failed.
    pub fn field(&self) -> &str {
        match self {
            Self::InvalidDate { field, .. }
            | Self::InvalidFrequency { field, .. }
            | Self::UnsupportedTimeLength { field, .. }
            | Self::InvalidTime { field, .. } => field,
        }
    }
}

/// Result alias for parse operations.
pub type ParseResult<T> = Result<T, ParseError>;
