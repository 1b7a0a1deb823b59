//! Sequential line reader with blank-line and comment skipping.

use std::io::{self, BufRead, Read};

/// Pulls one logical line at a time from a buffered character source.
///
/// The line counter counts every physical line consumed, skipped ones
/// included, and reads as `None` once the end of the source has been
/// observed or the source has been closed.
pub struct LineSource<R> {
    reader: Option<R>,
    line_number: u64,
    exhausted: bool,
    trim_whitespace: bool,
    ignore_blank_lines: bool,
    comment_tokens: Vec<String>,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
            line_number: 0,
            exhausted: false,
            trim_whitespace: false,
            ignore_blank_lines: false,
            comment_tokens: Vec::new(),
        }
    }

    pub fn trim_whitespace(mut self, enabled: bool) -> Self {
        self.trim_whitespace = enabled;
        self
    }

    pub fn ignore_blank_lines(mut self, enabled: bool) -> Self {
        self.ignore_blank_lines = enabled;
        self
    }

    pub fn comment_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.comment_tokens = tokens
            .into_iter()
            .map(Into::<String>::into)
            .filter(|token| !token.is_empty())
            .collect();
        self
    }

    pub fn line_number(&self) -> Option<u64> {
        if self.exhausted || self.line_number == 0 {
            None
        } else {
            Some(self.line_number)
        }
    }

    /// Physical lines consumed so far, skipped ones included. Unlike
    /// [`LineSource::line_number`] this keeps its value after exhaustion.
    pub fn lines_read(&self) -> u64 {
        self.line_number
    }

    /// Peeks the raw source; `true` once no bytes are left to read.
    ///
    /// Lines that [`LineSource::read_line`] would skip still count as
    /// input here, so `false` can be followed by a `read_line` that
    /// returns `None`.
    pub fn is_exhausted(&mut self) -> io::Result<bool> {
        let at_end = match self.reader.as_mut() {
            Some(reader) => reader.fill_buf()?.is_empty(),
            None => true,
        };
        if at_end {
            self.exhausted = true;
        }
        Ok(at_end)
    }

    /// Reads the next line that is not skipped, without its terminator.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        loop {
            let Some(raw) = self.read_physical_line()? else {
                return Ok(None);
            };
            if self.is_ignored(&raw) {
                continue;
            }
            if self.trim_whitespace {
                return Ok(Some(raw.trim().to_string()));
            }
            return Ok(Some(raw));
        }
    }

    pub fn skip_line(&mut self) -> io::Result<()> {
        self.read_line().map(|_| ())
    }

    pub fn skip_lines(&mut self, count: usize) -> io::Result<()> {
        for _ in 0..count {
            if self.is_exhausted()? {
                break;
            }
            self.skip_line()?;
        }
        Ok(())
    }

    /// Returns everything left in the source verbatim.
    pub fn read_to_end(&mut self) -> io::Result<String> {
        let mut rest = String::new();
        if let Some(reader) = self.reader.as_mut() {
            reader.read_to_string(&mut rest)?;
        }
        self.exhausted = true;
        Ok(rest)
    }

    /// Releases the underlying reader. Further reads see an empty source.
    pub fn close(&mut self) {
        self.reader = None;
        self.exhausted = true;
    }

    fn read_physical_line(&mut self) -> io::Result<Option<String>> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };
        let mut buf = String::new();
        if reader.read_line(&mut buf)? == 0 {
            self.exhausted = true;
            return Ok(None);
        }
        self.line_number += 1;
        let end = buf.trim_end_matches(['\r', '\n']).len();
        buf.truncate(end);
        Ok(Some(buf))
    }

    fn is_ignored(&self, line: &str) -> bool {
        let trimmed = line.trim();
        if self.ignore_blank_lines && trimmed.is_empty() {
            return true;
        }
        self.comment_tokens
            .iter()
            .any(|token| trimmed.starts_with(token.as_str()))
    }
}
