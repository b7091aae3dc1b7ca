use crate::types::{ByteOffset, END_OF_HEADER, END_OF_RECORD};

const HEADER_END_MARKER: &[u8] = b"<eoh>";

/// Position of the scanner in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Looking for the first `<eoh>`; nothing has been tokenized yet.
    SeekingHeaderEnd,
    /// Reading `<name:len>value` fields.
    ScanningFields,
}

/// One unit of ADIF structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A field with its decoded value.
    Field {
        /// Lowercased field name.
        name: String,
        /// Value with `&lt;` decoded.
        value: String,
    },
    /// A field definition without a length; carries no value.
    Bare {
        /// Lowercased field name.
        name: String,
    },
    /// A field definition whose length is not a number.
    MalformedLength {
        /// Lowercased field name.
        name: String,
        /// Definition text between `<` and `>`.
        definition: String,
        /// Offset of the `<`.
        offset: ByteOffset,
    },
    /// `<eor>`.
    EndOfRecord,
    /// `<eoh>`.
    EndOfHeader,
}

/// Result of one scanner step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A complete token was read.
    Token(Token),
    /// The buffer ends before the next token is complete.
    NeedMore,
    /// No further tokens exist.
    Done,
}

/// Two-state tokenizer over a text buffer.
///
/// The scanner never owns text. Each call to [`Scanner::next`] receives the
/// current buffer and whether it is the final one; when it is not, a token
/// cut off by the buffer end yields [`Step::NeedMore`] and the scanner stays
/// at the token start so the caller can append and retry.
#[derive(Debug, Clone)]
pub struct Scanner {
    state: ScanState,
    pos: usize,
    base: ByteOffset,
    header_search_from: usize,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    /// Creates a scanner at the start of a document.
    pub fn new() -> Self {
        Self {
            state: ScanState::SeekingHeaderEnd,
            pos: 0,
            base: 0,
            header_search_from: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Bytes of the current buffer that are fully consumed.
    pub fn consumed(&self) -> usize {
        self.pos
    }

    /// Tells the scanner the caller dropped the first `n` consumed bytes.
    pub fn discard_prefix(&mut self, n: usize) {
        debug_assert!(n <= self.pos);
        self.pos -= n;
        self.base += n;
        self.header_search_from = self.header_search_from.saturating_sub(n);
    }

    /// Reads the next token from `buf`.
    pub fn next(&mut self, buf: &str, eof: bool) -> Step {
        if self.state == ScanState::SeekingHeaderEnd {
            match self.seek_header_end(buf, eof) {
                Some(step) => return step,
                None => self.state = ScanState::ScanningFields,
            }
        }
        self.next_field(buf, eof)
    }

    // Returns `None` once the input is known to have no header.
    fn seek_header_end(&mut self, buf: &str, eof: bool) -> Option<Step> {
        let bytes = buf.as_bytes();
        if let Some(at) = find_ci(&bytes[self.header_search_from..], HEADER_END_MARKER) {
            self.pos = self.header_search_from + at + HEADER_END_MARKER.len();
            self.state = ScanState::ScanningFields;
            return Some(Step::Token(Token::EndOfHeader));
        }
        if eof {
            self.pos = 0;
            return None;
        }
        self.header_search_from = bytes.len().saturating_sub(HEADER_END_MARKER.len() - 1);
        Some(Step::NeedMore)
    }

    fn next_field(&mut self, buf: &str, eof: bool) -> Step {
        let bytes = buf.as_bytes();
        let Some(open) = find_byte(bytes, self.pos, b'<') else {
            self.pos = bytes.len();
            return if eof { Step::Done } else { Step::NeedMore };
        };
        let Some(close) = find_byte(bytes, open + 1, b'>') else {
            self.pos = open;
            return if eof { Step::Done } else { Step::NeedMore };
        };

        let definition = &buf[open + 1..close];
        let mut parts = definition.split(':');
        let name = parts.next().unwrap_or_default().to_ascii_lowercase();

        if name == END_OF_RECORD {
            self.pos = close + 1;
            return Step::Token(Token::EndOfRecord);
        }
        if name == END_OF_HEADER {
            self.pos = close + 1;
            return Step::Token(Token::EndOfHeader);
        }

        let Some(len_text) = parts.next() else {
            self.pos = close + 1;
            return Step::Token(Token::Bare { name });
        };
        let Ok(len) = len_text.trim().parse::<usize>() else {
            self.pos = close + 1;
            return Step::Token(Token::MalformedLength {
                name,
                definition: definition.to_string(),
                offset: self.base + open,
            });
        };

        let start = close + 1;
        let rest = &buf[start..];
        let end = match rest.char_indices().nth(len) {
            Some((idx, _)) => start + idx,
            None if rest.chars().count() == len || eof => buf.len(),
            None => {
                self.pos = open;
                return Step::NeedMore;
            }
        };

        self.pos = end;
        Step::Token(Token::Field {
            name,
            value: decode_entities(&buf[start..end]),
        })
    }
}

/// Decodes the one entity ADIF writers escape.
pub fn decode_entities(raw: &str) -> String {
    raw.replace("&lt;", "<")
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|b| *b == needle)
        .map(|i| from + i)
}

fn find_ci(hay: &[u8], needle: &[u8]) -> Option<usize> {
    if hay.len() < needle.len() {
        return None;
    }
    hay.windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        let mut scanner = Scanner::new();
        let mut out = Vec::new();
        while let Step::Token(t) = scanner.next(input, true) {
            out.push(t);
        }
        out
    }

    fn field(name: &str, value: &str) -> Token {
        Token::Field {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn header_is_skipped_before_first_token() {
        let toks = tokens("Exported by <b>me</b>\n<adif_ver:5>3.1.4 <EOH> <call:4>W1AW<eor>");
        assert_eq!(
            toks,
            vec![Token::EndOfHeader, field("call", "W1AW"), Token::EndOfRecord]
        );
    }

    #[test]
    fn headerless_input_scans_from_start() {
        let toks = tokens("<CALL:4:S>W1AW <Band:3>20m <EoR>");
        assert_eq!(
            toks,
            vec![field("call", "W1AW"), field("band", "20m"), Token::EndOfRecord]
        );
    }

    #[test]
    fn bare_and_malformed_definitions_are_reported() {
        let toks = tokens("<app_x><comment:zz>abc<name: 2 >Al");
        assert_eq!(toks[0], Token::Bare { name: "app_x".into() });
        assert_eq!(
            toks[1],
            Token::MalformedLength {
                name: "comment".into(),
                definition: "comment:zz".into(),
                offset: 7,
            }
        );
        assert_eq!(toks[2], field("name", "Al"));
    }

    #[test]
    fn value_length_counts_characters_and_may_contain_markers() {
        let toks = tokens("<name:4>Jörg<notes:9>a&lt;b<c><eor>");
        assert_eq!(toks[0], field("name", "Jörg"));
        assert_eq!(toks[1], field("notes", "a<b<c>"));
        assert_eq!(toks[2], Token::EndOfRecord);
    }

    #[test]
    fn truncated_value_takes_what_is_left_at_eof() {
        assert_eq!(tokens("<call:10>W1AW"), vec![field("call", "W1AW")]);
    }

    #[test]
    fn partial_buffer_asks_for_more_and_keeps_position() {
        let mut scanner = Scanner::new();
        assert_eq!(scanner.next("<call:4>W1", false), Step::NeedMore);
        assert_eq!(scanner.state(), ScanState::SeekingHeaderEnd);
        // Header unresolved: only the final buffer settles it.
        assert_eq!(
            scanner.next("<call:4>W1AW", true),
            Step::Token(field("call", "W1AW"))
        );
    }

    #[test]
    fn unclosed_definition_ends_scan() {
        assert_eq!(tokens("<call:4>W1AW<eor"), vec![field("call", "W1AW")]);
    }
}
