use serde::Serialize;

use crate::{
    core::{
        assembler::RecordAssembler,
        diagnostics::Diagnostic,
        scan::{Scanner, Step},
        stream::StreamParser,
    },
    error::ParseResult,
    record::Record,
    types::RecordNo,
};

/// What to do when a date, frequency or time field cannot be typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FatalPolicy {
    /// Fail the whole parse with the error.
    #[default]
    Abort,
    /// Drop the offending record, note it as a diagnostic, keep going.
    SkipRecord,
}

/// Parser settings.
#[derive(Debug, Clone, Default)]
pub struct ParserConfig {
    /// Reaction to untypable strict fields.
    pub fatal_policy: FatalPolicy,
}

/// Records of one document plus everything recovered along the way.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ParseOutcome {
    /// Closed records in document order.
    pub records: Vec<Record>,
    /// Recoverable conditions in the order they were met.
    pub diagnostics: Vec<Diagnostic>,
}

/// Reusable ADIF parser.
///
/// Holds no document state between calls; only the record ordinal used in
/// diagnostics keeps counting across [`AdifParser::parse`] invocations.
#[derive(Debug, Clone, Default)]
pub struct AdifParser {
    config: ParserConfig,
    next_record: RecordNo,
}

impl AdifParser {
    /// Creates a parser with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser with `config`.
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            next_record: 0,
        }
    }

    /// Active settings.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Total records closed by this instance, across all calls.
    pub fn records_seen(&self) -> RecordNo {
        self.next_record
    }

    /// Parses a complete document into records.
    pub fn parse(&mut self, input: &str) -> ParseResult<Vec<Record>> {
        self.parse_with_diagnostics(input).map(|out| out.records)
    }

    /// Parses a complete document, also returning recovered diagnostics.
    pub fn parse_with_diagnostics(&mut self, input: &str) -> ParseResult<ParseOutcome> {
        let mut scanner = Scanner::new();
        let mut asm = RecordAssembler::new(self.config.clone(), self.next_record);

        let res = loop {
            match scanner.next(input, true) {
                Step::Token(token) => {
                    if let Err(err) = asm.accept(token) {
                        break Err(err);
                    }
                }
                Step::NeedMore | Step::Done => break Ok(()),
            }
        };

        self.next_record = asm.next_record();
        res.map(|()| asm.finish())
    }

    /// Starts a chunked parse that continues this parser's record ordinals.
    pub fn stream(&self) -> StreamParser {
        StreamParser::starting_at(self.config.clone(), self.next_record)
    }
}

/// Parses `input` with a fresh [`AdifParser`].
pub fn parse(input: &str) -> ParseResult<Vec<Record>> {
    AdifParser::new().parse(input)
}
