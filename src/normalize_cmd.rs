use std::io::Write;

use anyhow::{Context, Result};
use log::info;

use crate::{cli::NormalizeArgs, io_utils, line_source::LineSource, normalizer};

/// Prints every accepted line as the tokenizer will see it, prefixed by
/// its source line number, with quote markers rendered as bracketed
/// labels. Comment and blank-line skipping apply to the raw lines.
pub fn execute(args: &NormalizeArgs) -> Result<()> {
    let options = crate::resolve_parser_options(&args.input)?;
    let encoding = io_utils::resolve_encoding(args.input.input_encoding.as_deref())?;
    let delimiter = options.primary_delimiter().to_string();
    let input = io_utils::open_text_input(&args.input.input, encoding)?;
    let mut source = LineSource::new(input)
        .trim_whitespace(options.trim_whitespace)
        .ignore_blank_lines(options.ignore_blank_lines)
        .comment_tokens(options.comment_tokens.iter().cloned());
    let normalized = normalizer::normalize_source(&mut source, Some(delimiter.as_str()))
        .with_context(|| format!("Normalizing {:?}", args.input.input))?;
    drop(source);

    let mut out = io_utils::open_output(None)?;
    let mut count = 0usize;
    for (line, number) in normalized.text.lines().zip(&normalized.line_numbers) {
        writeln!(out, "{number}\t{}", normalizer::describe(line))?;
        count += 1;
    }
    out.flush()?;
    info!(
        "Normalized {count} line(s) from '{}' using delimiter '{}'",
        args.input.input.display(),
        crate::printable_delimiter(options.primary_delimiter())
    );
    Ok(())
}
