//! Parser configuration.
//!
//! [`ParserOptions`] can be built in code, loaded from a YAML file, or
//! assembled from command-line flags (see [`crate::cli::InputArgs`]).

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result as AnyResult};
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, Result};

pub const DEFAULT_DELIMITER: char = ',';
pub const QUOTE: char = '"';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Characters that separate fields. The first one also drives quote
    /// normalization.
    pub delimiters: Vec<char>,
    /// Honor `"`-wrapped fields and run the quote normalization pass.
    pub quoting: bool,
    /// Treat a run of delimiters as a single field boundary.
    pub squeeze_delimiters: bool,
    /// Trim leading and trailing whitespace from lines and fields.
    pub trim_whitespace: bool,
    /// Lines whose trimmed content starts with any of these are skipped.
    pub comment_tokens: Vec<String>,
    pub ignore_blank_lines: bool,
    /// The first accepted record holds column names rather than data.
    pub has_header: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            delimiters: vec![DEFAULT_DELIMITER],
            quoting: false,
            squeeze_delimiters: false,
            trim_whitespace: false,
            comment_tokens: Vec::new(),
            ignore_blank_lines: false,
            has_header: false,
        }
    }
}

impl ParserOptions {
    pub fn load(path: &Path) -> AnyResult<Self> {
        let file =
            File::open(path).with_context(|| format!("Opening parser options file {path:?}"))?;
        let reader = BufReader::new(file);
        let options: ParserOptions =
            serde_yaml::from_reader(reader).context("Parsing parser options YAML")?;
        options
            .validate()
            .with_context(|| format!("Validating parser options from {path:?}"))?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        validate_delimiters(&self.delimiters)
    }

    /// Delimiter used by the quote normalization cascade.
    pub fn primary_delimiter(&self) -> char {
        self.delimiters
            .first()
            .copied()
            .unwrap_or(DEFAULT_DELIMITER)
    }
}

pub(crate) fn validate_delimiters(delimiters: &[char]) -> Result<()> {
    if delimiters.is_empty() {
        return Err(ParseError::NoDelimiters);
    }
    match delimiters.iter().find(|c| matches!(c, '\r' | '\n')) {
        Some(&bad) => Err(ParseError::InvalidDelimiter(bad)),
        None => Ok(()),
    }
}
