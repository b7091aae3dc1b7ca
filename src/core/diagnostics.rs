use std::fmt;

use serde::Serialize;

use crate::{
    error::ParseError,
    types::{ByteOffset, RecordNo},
};

/// A recoverable condition met while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// An integer field held text that is not an integer; `-1` was stored.
    IntegerFallback {
        /// Field name.
        field: String,
        /// Ordinal of the record being closed.
        record: RecordNo,
        /// Raw text that failed to parse.
        value: String,
    },
    /// A field definition carried a length that is not a number.
    MalformedLength {
        /// Field name.
        field: String,
        /// Full definition text between `<` and `>`.
        definition: String,
        /// Offset of the opening `<`.
        offset: ByteOffset,
    },
    /// A record failed strict coercion and was dropped.
    RecordSkipped {
        /// Ordinal of the dropped record.
        record: RecordNo,
        /// Rendered parse error.
        reason: String,
    },
    /// Input ended while a record was still open.
    UnterminatedRecord {
        /// Number of fields staged in the dropped record.
        fields: usize,
    },
}

impl Diagnostic {
    pub(crate) fn skipped(err: &ParseError) -> Self {
        Self::RecordSkipped {
            record: err.record(),
            reason: err.to_string(),
        }
    }

    /// Record ordinal the diagnostic refers to, when there is one.
    pub fn record(&self) -> Option<RecordNo> {
        match self {
            Self::IntegerFallback { record, .. } | Self::RecordSkipped { record, .. } => {
                Some(*record)
            }
            Self::MalformedLength { .. } | Self::UnterminatedRecord { .. } => None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IntegerFallback {
                field,
                record,
                value,
            } => write!(
                f,
                "unable to convert field {field} (record {record}) to integer: {value:?}"
            ),
            Self::MalformedLength {
                field,
                definition,
                offset,
            } => write!(
                f,
                "field {field} at offset {offset} has unparsable length in <{definition}>"
            ),
            Self::RecordSkipped { record, reason } => {
                write!(f, "record {record} skipped: {reason}")
            }
            Self::UnterminatedRecord { fields } => {
                write!(f, "input ended inside a record with {fields} field(s)")
            }
        }
    }
}

/// Records diagnostics and mirrors each one to `tracing`.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs and stores `diag`.
    pub fn push(&mut self, diag: Diagnostic) {
        match &diag {
            Diagnostic::IntegerFallback {
                field,
                record,
                value,
            } => tracing::error!(field = %field, record, value = %value, "{diag}"),
            Diagnostic::MalformedLength { field, offset, .. } => {
                tracing::warn!(field = %field, offset, "{diag}")
            }
            Diagnostic::RecordSkipped { record, .. } => tracing::warn!(record, "{diag}"),
            Diagnostic::UnterminatedRecord { fields } => tracing::debug!(fields, "{diag}"),
        }
        self.entries.push(diag);
    }

    /// Number of collected diagnostics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the collector.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
