//! Character-level state machine that splits one line into raw fields.

use crate::{
    error::{ParseError, Result},
    options::{self, ParserOptions, QUOTE},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    InDelimiter,
    InText,
    InQuoted,
    InClosingQuote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Delimiter,
    Quote,
    Other,
}

/// Splits normalized lines on a delimiter set, optionally honoring
/// `"`-wrapped fields.
///
/// A tokenizer keeps its buffers between calls so one instance can be
/// reused for every line of a stream. State is reset at the start of each
/// line, so a line that failed does not affect the next one.
#[derive(Debug, Clone)]
pub struct FieldTokenizer {
    delimiters: Vec<char>,
    quoting: bool,
    squeeze_delimiters: bool,
    state: ParserState,
    field: String,
    fields: Vec<String>,
}

impl FieldTokenizer {
    pub fn new(delimiters: &[char]) -> Result<Self> {
        options::validate_delimiters(delimiters)?;
        Ok(Self {
            delimiters: delimiters.to_vec(),
            quoting: false,
            squeeze_delimiters: false,
            state: ParserState::InDelimiter,
            field: String::new(),
            fields: Vec::new(),
        })
    }

    pub fn from_options(options: &ParserOptions) -> Result<Self> {
        Ok(Self::new(&options.delimiters)?
            .quoting(options.quoting)
            .squeeze_delimiters(options.squeeze_delimiters))
    }

    pub fn quoting(mut self, enabled: bool) -> Self {
        self.quoting = enabled;
        self
    }

    pub fn squeeze_delimiters(mut self, enabled: bool) -> Self {
        self.squeeze_delimiters = enabled;
        self
    }

    pub fn delimiters(&self) -> &[char] {
        &self.delimiters
    }

    pub fn classify(&self, c: char) -> CharClass {
        if self.delimiters.contains(&c) {
            CharClass::Delimiter
        } else if self.quoting && c == QUOTE {
            CharClass::Quote
        } else {
            CharClass::Other
        }
    }

    /// Splits `line` into raw fields. `line_number` is only used for error
    /// reporting.
    pub fn tokenize(&mut self, line: &str, line_number: u64) -> Result<Vec<String>> {
        self.reset();
        for (idx, c) in line.chars().enumerate() {
            self.step(c, line_number, idx + 1)?;
        }
        self.finish(line_number)?;
        Ok(std::mem::take(&mut self.fields))
    }

    fn reset(&mut self) {
        self.state = ParserState::InDelimiter;
        self.field.clear();
        self.fields.clear();
    }

    fn step(&mut self, c: char, line: u64, column: usize) -> Result<()> {
        use CharClass::*;
        use ParserState::*;

        self.state = match (self.state, self.classify(c)) {
            (InDelimiter, Delimiter) => {
                if !self.squeeze_delimiters {
                    self.emit();
                }
                InDelimiter
            }
            (InDelimiter, Quote) => InQuoted,
            (InDelimiter, Other) => {
                self.field.push(c);
                InText
            }
            (InText, Delimiter) => {
                self.emit();
                InDelimiter
            }
            (InText, Quote) => return Err(ParseError::UnexpectedQuote { line, column }),
            (InText, Other) => {
                self.field.push(c);
                InText
            }
            (InQuoted, Delimiter | Other) => {
                self.field.push(c);
                InQuoted
            }
            (InQuoted, Quote) => InClosingQuote,
            (InClosingQuote, Delimiter) => {
                self.emit();
                InDelimiter
            }
            // A quote right after a closing quote opens a new field rather
            // than escaping a literal quote.
            (InClosingQuote, Quote) => {
                self.emit();
                InQuoted
            }
            (InClosingQuote, Other) => {
                return Err(ParseError::MissingDelimiter { line, column });
            }
        };
        Ok(())
    }

    fn finish(&mut self, line: u64) -> Result<()> {
        match self.state {
            ParserState::InDelimiter | ParserState::InText | ParserState::InClosingQuote => {
                self.emit();
                self.state = ParserState::InDelimiter;
                Ok(())
            }
            ParserState::InQuoted => Err(ParseError::UnterminatedQuote { line }),
        }
    }

    fn emit(&mut self) {
        self.fields.push(std::mem::take(&mut self.field));
    }
}
