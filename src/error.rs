//! Error types for the parsing core.

use std::io;

use thiserror::Error;

/// Failures raised while reading, normalizing or tokenizing delimited text.
///
/// Every variant is fatal to the operation that produced it. Callers that
/// want per-record fault isolation catch at the record boundary; the reader
/// is left positioned on the following line.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The underlying character source failed.
    #[error("I/O error while reading delimited text: {0}")]
    Io(#[from] io::Error),

    /// The source reported more input but produced no line.
    #[error("Expected a line at line {line} but the source yielded none")]
    Format { line: u64 },

    /// A quote appeared inside unquoted text after normalization.
    #[error("Unexpected quote in unquoted field at line {line}, column {column}")]
    UnexpectedQuote { line: u64, column: usize },

    /// Content followed a closing quote without a delimiter in between.
    #[error("Expected delimiter after closing quote at line {line}, column {column}")]
    MissingDelimiter { line: u64, column: usize },

    /// The line ended inside a quoted field.
    #[error("Closing quote was expected before the end of line {line}")]
    UnterminatedQuote { line: u64 },

    /// A line-break character was configured as a field delimiter.
    #[error("Invalid delimiter {0:?}: line breaks cannot separate fields")]
    InvalidDelimiter(char),

    /// The delimiter set is empty.
    #[error("At least one field delimiter must be configured")]
    NoDelimiters,
}

impl ParseError {
    /// Source line the error refers to, when it is tied to one.
    pub fn line(&self) -> Option<u64> {
        match self {
            ParseError::Format { line }
            | ParseError::UnexpectedQuote { line, .. }
            | ParseError::MissingDelimiter { line, .. }
            | ParseError::UnterminatedQuote { line } => Some(*line),
            _ => None,
        }
    }
}

/// Result alias for the parsing core.
pub type Result<T> = std::result::Result<T, ParseError>;
