use crate::{
    core::{
        coerce,
        diagnostics::{Diagnostic, Diagnostics},
        parser::{FatalPolicy, ParseOutcome, ParserConfig},
        scan::Token,
    },
    error::ParseResult,
    record::{RawRecord, Record},
    types::RecordNo,
};

/// Turns scanner tokens into closed, typed records.
#[derive(Debug)]
pub struct RecordAssembler {
    config: ParserConfig,
    staging: RawRecord,
    records: Vec<Record>,
    diagnostics: Diagnostics,
    next_record: RecordNo,
}

impl RecordAssembler {
    /// Creates an assembler whose first closed record gets ordinal `next_record`.
    pub fn new(config: ParserConfig, next_record: RecordNo) -> Self {
        Self {
            config,
            staging: RawRecord::new(),
            records: Vec::new(),
            diagnostics: Diagnostics::new(),
            next_record,
        }
    }

    /// Ordinal the next closed record will get.
    pub fn next_record(&self) -> RecordNo {
        self.next_record
    }

    /// Records closed and kept so far.
    pub fn closed(&self) -> usize {
        self.records.len()
    }

    /// Applies one token.
    pub fn accept(&mut self, token: Token) -> ParseResult<()> {
        match token {
            Token::Field { name, value } => {
                self.staging.insert(name, value);
            }
            Token::Bare { .. } => {}
            Token::MalformedLength {
                name,
                definition,
                offset,
            } => self.diagnostics.push(Diagnostic::MalformedLength {
                field: name,
                definition,
                offset,
            }),
            Token::EndOfRecord => return self.close_record(),
            Token::EndOfHeader => {
                if !self.records.is_empty() || !self.staging.is_empty() {
                    tracing::debug!(
                        records = self.records.len(),
                        fields = self.staging.len(),
                        "discarding header content"
                    );
                }
                self.records.clear();
                self.staging.clear();
            }
        }
        Ok(())
    }

    fn close_record(&mut self) -> ParseResult<()> {
        let raw = std::mem::take(&mut self.staging);
        let record = self.next_record;
        let fixed = coerce::fixup(raw, record, &mut self.diagnostics);
        self.next_record += 1;

        match fixed {
            Ok(rec) => {
                tracing::debug!(record, fields = rec.len(), "record closed");
                self.records.push(rec);
                Ok(())
            }
            Err(err) => match self.config.fatal_policy {
                FatalPolicy::Abort => Err(err),
                FatalPolicy::SkipRecord => {
                    self.diagnostics.push(Diagnostic::skipped(&err));
                    Ok(())
                }
            },
        }
    }

    /// Ends the document, dropping any unterminated record.
    pub fn finish(mut self) -> ParseOutcome {
        if !self.staging.is_empty() {
            self.diagnostics.push(Diagnostic::UnterminatedRecord {
                fields: self.staging.len(),
            });
        }
        ParseOutcome {
            records: self.records,
            diagnostics: self.diagnostics.into_vec(),
        }
    }
}
