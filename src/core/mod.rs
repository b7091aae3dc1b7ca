//! ADIF tokenizing, record assembly and field coercion.

/// Token-to-record state and fatal-error policy.
pub mod assembler;
/// Field-name coercion table.
pub mod coerce;
/// Recoverable parse conditions.
pub mod diagnostics;
/// Whole-buffer parser and its settings.
pub mod parser;
/// Two-state tokenizer.
pub mod scan;
/// Chunk-fed parser.
pub mod stream;
