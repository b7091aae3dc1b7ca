//! ADIF log parsing into typed QSO records.
//!
//! # Examples
//!
//! Whole-document parsing with [`core::parser::parse`]:
//! ```
//! use adiflog::core::parser::parse;
//!
//! let text = "Exported by my logger\n<adif_ver:5>3.1.4 <eoh>\n\
//!             <call:5>K6SRZ <qso_date:8>20130527 <time_on:4>0831 <freq:7>14.0711 <dxcc:3>291 <eor>";
//! let records = parse(text).expect("parse");
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].text("call"), Some("K6SRZ"));
//! assert_eq!(records[0].int("dxcc"), Some(291));
//! ```
//!
//! Recoverable problems are returned next to the records:
//! ```
//! use adiflog::core::{diagnostics::Diagnostic, parser::AdifParser};
//!
//! let mut parser = AdifParser::new();
//! let out = parser.parse_with_diagnostics("<dxcc:7>notanum<eor>").expect("parse");
//! assert_eq!(out.records[0].int("dxcc"), Some(-1));
//! assert!(matches!(out.diagnostics[0], Diagnostic::IntegerFallback { .. }));
//! ```
//!
//! Runtime usage with chunked input:
//! ```no_run
//! use adiflog::runtime::handle::{spawn_importer, ImporterConfig};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let handle = spawn_importer(ImporterConfig::default());
//! let job = handle.open().await.expect("open");
//! handle.feed(job, "<call:4>W1AW <ba").await.expect("feed");
//! handle.feed(job, "nd:3>20m <eor>").await.expect("feed");
//! let out = handle.finish(job).await.expect("finish");
//! assert_eq!(out.records.len(), 1);
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![deny(missing_docs)]

/// Tokenizer, record assembly and coercion.
pub mod core;
/// Fatal parse errors.
pub mod error;
/// Typed record and field values.
pub mod record;
/// Async import runtime and events.
pub mod runtime;
/// Shared primitive types and constants.
pub mod types;
