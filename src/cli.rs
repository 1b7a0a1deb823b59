use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Parse delimited text that breaks the usual CSV quoting rules",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Parse a delimited file into records with literal quotes restored
    Parse(ParseArgs),
    /// Print each line after quote normalization, with markers made visible.
    /// Normalization always runs, so --quoted and --squeeze-delimiters have
    /// no effect here
    Normalize(NormalizeArgs),
}

/// Input and parser settings shared by every command.
#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Input file to read (`-` for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// YAML file with parser options; flags below override it
    #[arg(long = "options")]
    pub options: Option<PathBuf>,
    /// Field delimiter (repeatable; supports ',', 'tab', ';', '|')
    #[arg(long = "delimiter", value_parser = parse_delimiter, action = clap::ArgAction::Append)]
    pub delimiters: Vec<char>,
    /// Honor fields wrapped in double quotes
    #[arg(long)]
    pub quoted: bool,
    /// Treat runs of delimiters as a single field boundary
    #[arg(long = "squeeze-delimiters")]
    pub squeeze_delimiters: bool,
    /// Trim whitespace around lines and fields
    #[arg(long)]
    pub trim: bool,
    /// Skip lines starting with this token (repeatable)
    #[arg(long = "comment", action = clap::ArgAction::Append)]
    pub comments: Vec<String>,
    /// Skip blank lines
    #[arg(long = "ignore-blank-lines")]
    pub ignore_blank_lines: bool,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct ParseArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Treat the first accepted record as column names
    #[arg(long = "has-header")]
    pub has_header: bool,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Output rendering
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,
    /// Stop after this many records
    #[arg(long)]
    pub limit: Option<usize>,
    /// Log and skip malformed records instead of failing
    #[arg(long = "skip-invalid")]
    pub skip_invalid: bool,
}

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Fully quoted CSV using the primary input delimiter
    #[default]
    Csv,
    /// One JSON object per record with its source line number
    Json,
    /// Aligned text table
    Table,
}

pub fn parse_delimiter(value: &str) -> Result<char, String> {
    match value {
        "tab" | "\t" | "\\t" => Ok('\t'),
        "comma" | "," => Ok(','),
        "|" | "pipe" => Ok('|'),
        ";" | "semicolon" => Ok(';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if matches!(first, '\r' | '\n') {
                return Err("Delimiter cannot be a line break".to_string());
            }
            Ok(first)
        }
    }
}
