use crate::{
    core::{
        assembler::RecordAssembler,
        parser::{ParseOutcome, ParserConfig},
        scan::{ScanState, Scanner, Step},
    },
    error::ParseResult,
    types::RecordNo,
};

// Consumed text is dropped from the buffer once it grows past this.
const COMPACT_THRESHOLD: usize = 8 * 1024;

/// ADIF parser fed text in arbitrary chunks.
///
/// Produces exactly what [`AdifParser::parse_with_diagnostics`] produces for
/// the concatenated input. Until the header end is found, or the input is
/// known to have none, the whole input is buffered; afterwards only the
/// unfinished tail is kept.
///
/// [`AdifParser::parse_with_diagnostics`]: crate::core::parser::AdifParser::parse_with_diagnostics
#[derive(Debug)]
pub struct StreamParser {
    buf: String,
    scanner: Scanner,
    asm: RecordAssembler,
}

impl StreamParser {
    /// Creates a stream parser numbering records from zero.
    pub fn new(config: ParserConfig) -> Self {
        Self::starting_at(config, 0)
    }

    /// Creates a stream parser whose first record gets ordinal `next_record`.
    pub fn starting_at(config: ParserConfig, next_record: RecordNo) -> Self {
        Self {
            buf: String::new(),
            scanner: Scanner::new(),
            asm: RecordAssembler::new(config, next_record),
        }
    }

    /// Appends a chunk and consumes every token it completes.
    ///
    /// An error leaves the parser in an unspecified position; drop it.
    pub fn feed(&mut self, chunk: &str) -> ParseResult<()> {
        self.buf.push_str(chunk);
        self.drain(false)?;
        self.compact();
        Ok(())
    }

    /// Ends the input and returns the document.
    pub fn finish(mut self) -> ParseResult<ParseOutcome> {
        self.drain(true)?;
        Ok(self.asm.finish())
    }

    /// Records closed and kept so far.
    pub fn records_closed(&self) -> usize {
        self.asm.closed()
    }

    /// Bytes currently held back waiting for more input.
    pub fn buffered(&self) -> usize {
        self.buf.len() - self.scanner.consumed()
    }

    fn drain(&mut self, eof: bool) -> ParseResult<()> {
        loop {
            match self.scanner.next(&self.buf, eof) {
                Step::Token(token) => self.asm.accept(token)?,
                Step::NeedMore | Step::Done => return Ok(()),
            }
        }
    }

    fn compact(&mut self) {
        if self.scanner.state() == ScanState::SeekingHeaderEnd {
            return;
        }
        let consumed = self.scanner.consumed();
        if consumed >= COMPACT_THRESHOLD || consumed == self.buf.len() {
            self.buf.drain(..consumed);
            self.scanner.discard_prefix(consumed);
        }
    }
}
