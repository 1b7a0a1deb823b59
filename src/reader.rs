//! Record reader tying the line source, quote normalizer and tokenizer
//! together.
//!
//! Reading runs in two passes. The first pass moves the caller's reader
//! into a [`LineSource`] that applies trimming, blank-line and comment
//! skipping to the raw lines, rewrites each accepted line with
//! [`normalizer::normalize`] into an in-memory buffer and drops the
//! original reader. The second pass reads that buffer through a fresh
//! [`LineSource`], tokenizes each line and restores literal quotes field
//! by field. Source line numbers are carried over from the first pass.

use std::{
    borrow::Cow,
    io::{BufRead, Cursor},
};

use log::{debug, warn};

use crate::{
    error::Result,
    fields::{FieldSet, FieldWarning},
    line_source::LineSource,
    normalizer,
    options::ParserOptions,
    tokenizer::FieldTokenizer,
};

pub struct DelimitedReader {
    source: Option<LineSource<Cursor<String>>>,
    line_numbers: Vec<u64>,
    tokenizer: FieldTokenizer,
    options: ParserOptions,
    headers: Option<FieldSet>,
}

impl DelimitedReader {
    /// Runs the normalization pass over `reader` and prepares the record
    /// pass. With `has_header` set, the first accepted record is consumed
    /// here and exposed through [`DelimitedReader::headers`].
    pub fn from_reader<R: BufRead>(reader: R, options: ParserOptions) -> Result<Self> {
        options.validate()?;
        let tokenizer = FieldTokenizer::from_options(&options)?;

        let mut first_pass = LineSource::new(reader)
            .trim_whitespace(options.trim_whitespace)
            .ignore_blank_lines(options.ignore_blank_lines)
            .comment_tokens(options.comment_tokens.iter().cloned());
        let delimiter = options.primary_delimiter().to_string();
        let buffered = normalizer::normalize_source(
            &mut first_pass,
            options.quoting.then_some(delimiter.as_str()),
        )?;
        drop(first_pass);
        debug!(
            "Buffered {} line(s), {} byte(s) for record parsing (quoting {})",
            buffered.line_numbers.len(),
            buffered.text.len(),
            if options.quoting { "on" } else { "off" }
        );

        let source = LineSource::new(Cursor::new(buffered.text));
        let line_numbers = buffered.line_numbers;

        let mut parsed = Self {
            source: Some(source),
            line_numbers,
            tokenizer,
            options,
            headers: None,
        };
        if parsed.options.has_header {
            parsed.headers = parsed.read_record()?;
        }
        Ok(parsed)
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn headers(&self) -> Option<&FieldSet> {
        self.headers.as_ref()
    }

    /// Line number of the most recently read line, if any.
    pub fn line_number(&self) -> Option<u64> {
        let buffered = self.source.as_ref().and_then(LineSource::line_number)?;
        self.source_line(buffered)
    }

    fn source_line(&self, buffered: u64) -> Option<u64> {
        let idx = usize::try_from(buffered).ok()?.checked_sub(1)?;
        self.line_numbers.get(idx).copied()
    }

    /// Skipped lines never reach the buffer, so `false` means another
    /// record (or record error) is available.
    pub fn is_exhausted(&mut self) -> Result<bool> {
        match self.source.as_mut() {
            Some(source) => Ok(source.is_exhausted()?),
            None => Ok(true),
        }
    }

    /// Reads the next record, or `None` at the end of input.
    ///
    /// A tokenizer error consumes the offending line, so the caller may
    /// log it and keep reading.
    pub fn read_record(&mut self) -> Result<Option<FieldSet>> {
        let next = match self.source.as_mut() {
            Some(source) => source.read_line()?.map(|line| (line, source.lines_read())),
            None => None,
        };
        let Some((line, buffered)) = next else {
            self.close();
            return Ok(None);
        };
        let line_number = self.source_line(buffered).unwrap_or(buffered);
        assemble(&mut self.tokenizer, &self.options, &line, line_number).map(Some)
    }

    pub fn records(&mut self) -> Records<'_> {
        Records { reader: self }
    }

    /// Releases the buffered input. Later reads return `None`.
    pub fn close(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.close();
        }
        self.line_numbers = Vec::new();
    }
}

pub struct Records<'r> {
    reader: &'r mut DelimitedReader,
}

impl Iterator for Records<'_> {
    type Item = Result<FieldSet>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_record().transpose()
    }
}

/// Parses a single line with the same pipeline the reader uses. Blank-line,
/// comment and header options do not apply.
pub fn parse_line(line: &str, options: &ParserOptions) -> Result<FieldSet> {
    options.validate()?;
    let mut tokenizer = FieldTokenizer::from_options(options)?;
    let line = if options.trim_whitespace {
        line.trim()
    } else {
        line
    };
    let normalized = if options.quoting {
        let delimiter = options.primary_delimiter().to_string();
        Cow::Owned(normalizer::normalize(line, &delimiter))
    } else {
        Cow::Borrowed(line)
    };
    assemble(&mut tokenizer, options, &normalized, 1)
}

fn assemble(
    tokenizer: &mut FieldTokenizer,
    options: &ParserOptions,
    line: &str,
    line_number: u64,
) -> Result<FieldSet> {
    let raw = tokenizer.tokenize(line, line_number)?;
    let mut fields = Vec::with_capacity(raw.len());
    let mut warnings = Vec::new();
    for (idx, field) in raw.into_iter().enumerate() {
        let field = if options.trim_whitespace {
            field.trim().to_string()
        } else {
            field
        };
        if !options.quoting {
            fields.push(field);
            continue;
        }
        let restored = normalizer::restore(&field);
        if let Some(kind) = restored.warning {
            warn!("Line {line_number}, field {}: {kind}", idx + 1);
            warnings.push(FieldWarning { field: idx, kind });
        }
        fields.push(restored.into_value());
    }
    Ok(FieldSet::with_warnings(line_number, fields, warnings))
}
