use std::{io::Write, path::Path};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Serialize;

use crate::{
    cli::{OutputFormat, ParseArgs},
    fields::FieldSet,
    io_utils, table,
};

pub fn execute(args: &ParseArgs) -> Result<()> {
    let mut options = crate::resolve_parser_options(&args.input)?;
    options.has_header |= args.has_header;
    let encoding = io_utils::resolve_encoding(args.input.input_encoding.as_deref())?;
    info!(
        "Parsing '{}' with delimiter '{}' (quoting {})",
        args.input.input.display(),
        crate::printable_delimiter(options.primary_delimiter()),
        if options.quoting { "on" } else { "off" }
    );

    let output_delimiter = options.primary_delimiter();
    let mut reader = io_utils::open_delimited_reader(&args.input.input, options, encoding)?;
    let headers = reader.headers().cloned();

    let mut records = Vec::new();
    let mut skipped = 0usize;
    while args.limit.is_none_or(|limit| records.len() < limit) {
        match reader.read_record() {
            Ok(Some(record)) => records.push(record),
            Ok(None) => break,
            Err(err) if args.skip_invalid => {
                warn!("Skipping malformed record: {err}");
                skipped += 1;
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Parsing {:?}", args.input.input));
            }
        }
    }
    reader.close();

    let output = args.output.as_deref();
    match args.format {
        OutputFormat::Csv => write_csv(output, output_delimiter, headers.as_ref(), &records)?,
        OutputFormat::Json => write_json(output, headers.as_ref(), &records)?,
        OutputFormat::Table => {
            let rendered = table::render_records(headers.as_ref(), &records);
            let mut writer = io_utils::open_output(output)?;
            writer.write_all(rendered.as_bytes())?;
            writer.flush()?;
        }
    }

    let flagged = records.iter().filter(|r| !r.warnings().is_empty()).count();
    info!(
        "Parsed {} record(s); {} skipped; {} with data-quality warnings",
        records.len(),
        skipped,
        flagged
    );
    Ok(())
}

fn write_csv(
    output: Option<&Path>,
    delimiter: char,
    headers: Option<&FieldSet>,
    records: &[FieldSet],
) -> Result<()> {
    let mut writer = io_utils::open_csv_writer(output, delimiter)?;
    if let Some(headers) = headers {
        writer
            .write_record(headers.iter())
            .context("Writing header record")?;
    }
    for record in records {
        writer
            .write_record(record.iter())
            .with_context(|| format!("Writing record from line {}", record.line_number()))?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct HeaderLine<'a> {
    headers: &'a FieldSet,
}

/// JSON lines output. A captured header comes first, wrapped as
/// `{"headers":{...}}` so it cannot be mistaken for a record.
fn write_json(
    output: Option<&Path>,
    headers: Option<&FieldSet>,
    records: &[FieldSet],
) -> Result<()> {
    let mut writer = io_utils::open_output(output)?;
    if let Some(headers) = headers {
        serde_json::to_writer(&mut writer, &HeaderLine { headers })
            .context("Serializing header record as JSON")?;
        writer.write_all(b"\n")?;
    }
    for record in records {
        serde_json::to_writer(&mut writer, record).context("Serializing record as JSON")?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
