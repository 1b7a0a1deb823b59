pub mod cli;
pub mod error;
pub mod fields;
pub mod io_utils;
pub mod line_source;
pub mod normalize_cmd;
pub mod normalizer;
pub mod options;
pub mod parse_cmd;
pub mod reader;
pub mod table;
pub mod tokenizer;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug};

use crate::cli::{Cli, Commands, InputArgs};

pub use error::ParseError;
pub use fields::FieldSet;
pub use options::ParserOptions;
pub use reader::{DelimitedReader, parse_line};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_salvage", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Parse(args) => parse_cmd::execute(&args),
        Commands::Normalize(args) => normalize_cmd::execute(&args),
    }
}

/// Builds parser options from an optional YAML file overlaid with flags.
pub(crate) fn resolve_parser_options(args: &InputArgs) -> Result<ParserOptions> {
    let mut options = match &args.options {
        Some(path) => ParserOptions::load(path)
            .with_context(|| format!("Loading parser options from {path:?}"))?,
        None => ParserOptions {
            delimiters: io_utils::resolve_input_delimiter(&args.input, &[]),
            ..ParserOptions::default()
        },
    };
    if !args.delimiters.is_empty() {
        options.delimiters = args.delimiters.clone();
    }
    options.quoting |= args.quoted;
    options.squeeze_delimiters |= args.squeeze_delimiters;
    options.trim_whitespace |= args.trim;
    options.ignore_blank_lines |= args.ignore_blank_lines;
    options
        .comment_tokens
        .extend(args.comments.iter().filter(|c| !c.is_empty()).cloned());
    options.validate()?;
    debug!("Parser options: {options:?}");
    Ok(options)
}

pub(crate) fn printable_delimiter(delimiter: char) -> String {
    match delimiter {
        '\t' => "\\t".to_string(),
        '\n' => "\\n".to_string(),
        other => other.to_string(),
    }
}
