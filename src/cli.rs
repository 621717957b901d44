use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Append CSV rows to an Excel workbook, skipping dates it already holds",
    long_about = None
)]
pub struct Cli {
    /// Input CSV file (the run exits with a notice when omitted)
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
    /// Target Excel workbook (.xlsx)
    #[arg(short = 'w', long = "workbook")]
    pub workbook: Option<PathBuf>,
    /// Worksheet to append to (defaults to the first sheet)
    #[arg(long)]
    pub sheet: Option<String>,
    /// Column used for date deduplication (matched case-insensitively)
    #[arg(long = "date-column", default_value = "Date")]
    pub date_column: String,
    /// Strip a trailing totals row from the CSV before appending
    #[arg(long = "trailer-row")]
    pub trailer_row: bool,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Log file path (defaults to import_log.txt beside the workbook)
    #[arg(long)]
    pub log: Option<PathBuf>,
    /// Run the full pipeline and report without writing anything
    #[arg(long = "dry-run")]
    pub dry_run: bool,
    /// Print the run summary as JSON to stdout
    #[arg(long)]
    pub json: bool,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
