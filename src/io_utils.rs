//! I/O helpers shared by the commands.
//!
//! - **Delimiter resolution**: `.tsv` inputs default to tab, everything
//!   else to comma, unless delimiters are given explicitly.
//! - **Decoding**: input bytes are transcoded to UTF-8 through
//!   `encoding_rs_io` before they reach the line source.
//! - **stdin/stdout**: the `-` path convention routes through standard
//!   streams.

use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};
use encoding_rs_io::DecodeReaderBytesBuilder;

use crate::{options::ParserOptions, reader::DelimitedReader};

pub const DEFAULT_CSV_DELIMITER: char = ',';
pub const DEFAULT_TSV_DELIMITER: char = '\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: &[char]) -> Vec<char> {
    if !provided.is_empty() {
        return provided.to_vec();
    }
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => vec![DEFAULT_TSV_DELIMITER],
        _ => vec![DEFAULT_CSV_DELIMITER],
    }
}

/// Opens `path` (or stdin for `-`) as UTF-8 text decoded from `encoding`.
pub fn open_text_input(path: &Path, encoding: &'static Encoding) -> Result<Box<dyn BufRead>> {
    let raw: Box<dyn Read> = if is_dash(path) {
        Box::new(io::stdin().lock())
    } else {
        Box::new(File::open(path).with_context(|| format!("Opening input file {path:?}"))?)
    };
    let decoded = DecodeReaderBytesBuilder::new()
        .encoding(Some(encoding))
        .build(raw);
    Ok(Box::new(BufReader::new(decoded)))
}

pub fn open_delimited_reader(
    path: &Path,
    options: ParserOptions,
    encoding: &'static Encoding,
) -> Result<DelimitedReader> {
    let input = open_text_input(path, encoding)?;
    DelimitedReader::from_reader(input, options)
        .with_context(|| format!("Reading delimited text from {path:?}"))
}

pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(io::stdout()),
    })
}

/// CSV writer for re-emitting restored records. Every field is quoted so
/// the output parses cleanly with any standard CSV reader.
pub fn open_csv_writer(path: Option<&Path>, delimiter: char) -> Result<csv::Writer<Box<dyn Write>>> {
    if !delimiter.is_ascii() {
        return Err(anyhow!("Output delimiter '{delimiter}' must be ASCII"));
    }
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter as u8)
        .quote_style(QuoteStyle::Always)
        .double_quote(true)
        .flexible(true);
    Ok(builder.from_writer(open_output(path)?))
}
