//! Two-phase quote rewriting around the tokenizer.
//!
//! [`normalize`] runs on a whole line before tokenization. Quotes that wrap
//! a field stay real quote characters; every other quote is swapped for an
//! inert marker the tokenizer treats as plain text. After tokenization,
//! [`restore`] turns the markers in each field back into literal quotes.
//!
//! Markers are private-use code points, so they cannot be confused with
//! delimiters or quotes. Input that already contains these code points is
//! not supported.

use std::{borrow::Cow, fmt, io::BufRead};

use log::debug;
use serde::Serialize;

use crate::{
    error::{ParseError, Result},
    line_source::LineSource,
};

const Q: &str = "\"";
const Q2: &str = "\"\"";
const Q3: &str = "\"\"\"";
const Q4: &str = "\"\"\"\"";

const NULL_FIELD: &str = "\u{E000}";
const OPEN_QUOTE: &str = "\u{E001}";
const CLOSE_QUOTE: &str = "\u{E002}";
const SINGLE_QUOTE: &str = "\u{E003}";
const DOUBLE_QUOTE: &str = "\u{E004}";

const MARKERS: [(&str, &str); 5] = [
    (NULL_FIELD, "[{null}]"),
    (OPEN_QUOTE, "[{openQ}]"),
    (CLOSE_QUOTE, "[{closeQ}]"),
    (SINGLE_QUOTE, "[{singleQ}]"),
    (DOUBLE_QUOTE, "[{doubleQ}]"),
];

/// Rewrites one line so only field-wrapping quotes remain as `"`.
///
/// The rules run as an ordered cascade; each rule sees the previous
/// rule's output. Quotes are only recognized as wrapping when they sit
/// next to a delimiter, so a quoted first or last field is not unwrapped.
pub fn normalize(line: &str, delimiter: &str) -> String {
    let d = delimiter;
    let mut text = line.to_string();

    // Four quotes in a row are an escaped empty segment.
    replace_until_stable(&mut text, Q4, "");

    // Line edges.
    let single_in_quotes = format!("{OPEN_QUOTE}{SINGLE_QUOTE}{CLOSE_QUOTE}");
    replace_prefix(&mut text, &format!("{Q3}{d}"), &format!("{single_in_quotes}{d}"));
    replace_suffix(&mut text, &format!("{d}{Q3}"), &format!("{d}{single_in_quotes}"));
    replace_prefix(&mut text, &format!("{Q2}{d}"), &format!("{NULL_FIELD}{d}"));
    replace_suffix(&mut text, &format!("{d}{Q2}"), &format!("{d}{NULL_FIELD}"));
    replace_prefix(&mut text, &format!("{Q}{d}"), &format!("{SINGLE_QUOTE}{d}"));
    replace_suffix(&mut text, &format!("{d}{Q}"), &format!("{d}{SINGLE_QUOTE}"));

    // Whole fields between two delimiters.
    replace_until_stable(
        &mut text,
        &format!("{d}{Q2}{d}"),
        &format!("{d}{NULL_FIELD}{d}"),
    );
    replace_until_stable(
        &mut text,
        &format!("{d}{Q}{d}"),
        &format!("{d}{SINGLE_QUOTE}{d}"),
    );

    // Wrapping quotes next to a delimiter.
    replace_until_stable(&mut text, &format!("{d}{Q}"), &format!("{d}{OPEN_QUOTE}"));
    replace_until_stable(&mut text, &format!("{Q}{d}"), &format!("{CLOSE_QUOTE}{d}"));

    // Anything left is content.
    replace_until_stable(&mut text, Q2, DOUBLE_QUOTE);
    let text = text.replace(Q, SINGLE_QUOTE);

    // The tokenizer needs to see the wrapping quotes again.
    text.replace(OPEN_QUOTE, Q).replace(CLOSE_QUOTE, Q)
}

/// Lines accepted by a first pass, buffered one per `\n`-terminated line,
/// with the physical source line each one came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedLines {
    pub text: String,
    pub line_numbers: Vec<u64>,
}

/// Drains `source` into an in-memory buffer, rewriting each accepted line
/// with [`normalize`] when a delimiter is given and copying it unchanged
/// otherwise.
///
/// Blank-line and comment skipping is whatever `source` was configured
/// with, so it applies to the raw text before any quote is rewritten.
pub fn normalize_source<R: BufRead>(
    source: &mut LineSource<R>,
    delimiter: Option<&str>,
) -> Result<NormalizedLines> {
    let mut buffered = NormalizedLines::default();
    while !source.is_exhausted()? {
        let consumed = source.lines_read();
        let Some(line) = source.read_line()? else {
            // Trailing skipped lines end the source; a source that
            // reported input but gave up no line at all is malformed.
            if source.lines_read() == consumed {
                return Err(ParseError::Format { line: consumed + 1 });
            }
            break;
        };
        match delimiter {
            Some(delimiter) => buffered.text.push_str(&normalize(&line, delimiter)),
            None => buffered.text.push_str(&line),
        }
        buffered.text.push('\n');
        buffered
            .line_numbers
            .push(source.line_number().unwrap_or(consumed + 1));
    }
    debug!(
        "Buffered {} of {} line(s) (delimiter {:?})",
        buffered.line_numbers.len(),
        source.lines_read(),
        delimiter
    );
    Ok(buffered)
}

/// Normalizes every line of `reader` into an in-memory buffer.
///
/// The output holds exactly one `\n`-terminated line per physical input
/// line, so line numbers in the buffer match the original source. The
/// reader is consumed and dropped before this returns, whether or not
/// normalization succeeded.
pub fn normalize_stream<R: BufRead>(reader: R, delimiter: &str, trim: bool) -> Result<String> {
    let mut source = LineSource::new(reader).trim_whitespace(trim);
    normalize_source(&mut source, Some(delimiter)).map(|buffered| buffered.text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestoreWarning {
    /// The null-field marker shared a field with other content.
    NullMarkerWithContent,
}

impl fmt::Display for RestoreWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestoreWarning::NullMarkerWithContent => {
                write!(f, "empty-quoted-field marker found alongside other content")
            }
        }
    }
}

/// A field with its literal quotes put back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restored {
    pub value: String,
    pub warning: Option<RestoreWarning>,
}

impl Restored {
    fn clean(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            warning: None,
        }
    }

    pub fn into_value(self) -> String {
        self.value
    }
}

/// Replaces the markers left by [`normalize`] in one tokenized field.
pub fn restore(field: &str) -> Restored {
    if field.trim().is_empty() {
        return Restored::clean(field);
    }
    if field == NULL_FIELD {
        return Restored::clean("");
    }

    let mut value = Cow::Borrowed(field);
    let mut warning = None;
    if value.contains(NULL_FIELD) {
        warning = Some(RestoreWarning::NullMarkerWithContent);
        value = Cow::Owned(value.replace(NULL_FIELD, ""));
    }

    // A field of nothing but an escaped quote pair stood for `""`.
    if value == DOUBLE_QUOTE {
        return Restored {
            value: String::new(),
            warning,
        };
    }

    let value = value.replace(DOUBLE_QUOTE, Q).replace(SINGLE_QUOTE, Q);
    Restored { value, warning }
}

pub fn contains_sentinel(text: &str) -> bool {
    MARKERS.iter().any(|(marker, _)| text.contains(*marker))
}

/// Renders markers as readable bracketed labels such as `[{doubleQ}]`.
pub fn describe(text: &str) -> Cow<'_, str> {
    if !contains_sentinel(text) {
        return Cow::Borrowed(text);
    }
    let mut rendered = text.to_string();
    for (marker, label) in MARKERS {
        rendered = rendered.replace(marker, label);
    }
    Cow::Owned(rendered)
}

fn replace_until_stable(text: &mut String, from: &str, to: &str) {
    while text.contains(from) {
        *text = text.replace(from, to);
    }
}

fn replace_prefix(text: &mut String, prefix: &str, with: &str) {
    if let Some(rest) = text.strip_prefix(prefix) {
        *text = format!("{with}{rest}");
    }
}

fn replace_suffix(text: &mut String, suffix: &str, with: &str) {
    if let Some(head) = text.strip_suffix(suffix) {
        *text = format!("{head}{with}");
    }
}
