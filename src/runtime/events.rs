//! Runtime event stream payloads.

use crate::{core::diagnostics::Diagnostic, types::JobId};

/// Events emitted from the import runtime loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportEvent {
    /// A chunked job was opened.
    Opened {
        /// New job id.
        job: JobId,
    },
    /// A job recovered from a malformed field or record.
    Diagnostic {
        /// Job that produced it.
        job: JobId,
        /// What was recovered from.
        diagnostic: Diagnostic,
    },
    /// A job completed.
    Finished {
        /// Completed job id.
        job: JobId,
        /// Number of records produced.
        records: usize,
    },
    /// A job stopped on a fatal parse error.
    Failed {
        /// Failed job id.
        job: JobId,
        /// Rendered error.
        reason: String,
    },
}
