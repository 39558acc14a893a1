use clap::builder::styling::AnsiColor;
use clap::builder::Styles;
use clap::Parser;
use thiserror::Error;

use crate::filter::{DEFAULT_BARCODE_LEN, DEFAULT_OFFSET};

const fn extra_build_info() -> &'static str {
    match option_env!("CARGO_BUILD_DESC") {
        Some(e) => e,
        None => env!("CARGO_PKG_VERSION"),
    }
}
pub const VERSION: &str = extra_build_info();
const INFO_STRING: &str = "
cellsieve version ";
const AFTER_STRING: &str = "
   ──────────────────────────────────
   keep whitelisted cell barcodes, trim the barcode and UMI, count reads per cell";

// colouring of the help
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().bold())
    .usage(AnsiColor::BrightMagenta.on_default().bold())
    .literal(AnsiColor::BrightMagenta.on_default())
    .placeholder(AnsiColor::White.on_default());

/// Options which historically were spelled with a single dash, e.g. `-bc whitelist.tsv`.
const LEGACY_LONG_FLAGS: [&str; 4] = ["bc", "cells", "fq", "tab"];

#[derive(Parser, Debug)]
#[command(
    version = VERSION,
    about = format!("{}{}{}", INFO_STRING, VERSION, AFTER_STRING),
    arg_required_else_help = true,
    styles = STYLES
)]
pub struct Cli {
    /// the barcode whitelist. only the first tab-separated field of each line is used
    #[arg(long)]
    pub bc: String,

    /// the maximum number of whitelist lines to read
    #[arg(long, value_parser = parse_cells)]
    pub cells: usize,

    /// the input .fastq (or .fastq.gz) file
    #[arg(long)]
    pub fq: String,

    /// the output prefix. reads are written to <PREFIX>_final.fq
    #[arg(short)]
    pub output: String,

    /// pass `on` to write the per-barcode read counts to <PREFIX>_UMI_counts.tsv.
    /// any other value disables the table.
    #[arg(long, default_value = "off", verbatim_doc_comment)]
    pub tab: String,

    /// the length of the cell barcode at the start of each read
    #[arg(long, default_value_t = DEFAULT_BARCODE_LEN)]
    pub barcode_len: usize,

    /// the number of bases removed from the start of each kept read (barcode + UMI).
    /// must be greater than --barcode-len
    #[arg(long, default_value_t = DEFAULT_OFFSET, verbatim_doc_comment)]
    pub offset: usize,

    /// write a JSON summary of the run to this file
    #[arg(long)]
    pub summary: Option<String>,
}

impl Cli {
    /// Parses the process arguments, accepting the single dash spelling of the long options.
    pub fn parse_args() -> Self {
        Cli::parse_from(normalize_legacy_args(std::env::args()))
    }

    pub fn table_enabled(&self) -> bool {
        self.tab == "on"
    }
}

/// Rewrites `-bc`, `-cells`, `-fq` and `-tab` (optionally followed by `=value`) into their
/// `--` form so that clap can parse them. All other arguments are passed through unchanged.
pub fn normalize_legacy_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item=String>,
{
    args.into_iter()
        .map(|arg| {
            let Some(rest) = arg.strip_prefix('-') else {
                return arg;
            };
            if rest.starts_with('-') {
                return arg;
            }

            let name = rest.split('=').next().unwrap_or(rest);
            if LEGACY_LONG_FLAGS.contains(&name) {
                format!("-{arg}")
            } else {
                arg
            }
        })
        .collect()
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("invalid cell count '{0}': expected a non-negative integer")]
    InvalidCells(String),

    #[error(
        "invalid read layout: the offset ({offset}) must be greater than the barcode length \
         ({barcode_len}), and the barcode length must be at least 1"
    )]
    InvalidLayout { barcode_len: usize, offset: usize },
}

/// Parses the `cells` option. Unlike a lenient integer conversion, anything that is not a
/// non-negative integer is an error rather than zero.
pub fn parse_cells(arg: &str) -> Result<usize, ConfigError> {
    arg.parse::<usize>()
        .map_err(|_| ConfigError::InvalidCells(arg.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn legacy_flags_are_rewritten() {
        let out = normalize_legacy_args(args(&[
            "cellsieve", "-bc", "wl.tsv", "-cells=10", "-fq", "in.fq", "-tab", "on", "-o", "out",
        ]));
        assert_eq!(
            out,
            args(&[
                "cellsieve", "--bc", "wl.tsv", "--cells=10", "--fq", "in.fq", "--tab", "on", "-o",
                "out",
            ])
        );
    }

    #[test]
    fn modern_flags_and_values_untouched() {
        let input = args(&["cellsieve", "--bc", "-bc.tsv", "--offset", "30", "-o", "-"]);
        let out = normalize_legacy_args(input.clone());
        assert_eq!(out, input);
    }

    #[test]
    fn cells_must_be_a_non_negative_integer() {
        assert_eq!(parse_cells("50000"), Ok(50000));
        assert_eq!(parse_cells("0"), Ok(0));
        assert_eq!(
            parse_cells("ten"),
            Err(ConfigError::InvalidCells("ten".to_string()))
        );
        assert!(parse_cells("-1").is_err());
        assert!(parse_cells("").is_err());
    }

    #[test]
    fn table_switch() {
        let cli = Cli::parse_from(normalize_legacy_args(args(&[
            "cellsieve", "-bc", "wl.tsv", "-cells", "3", "-fq", "in.fq", "-o", "out", "-tab", "on",
        ])));
        assert!(cli.table_enabled());
        assert_eq!(cli.cells, 3);
        assert_eq!(cli.barcode_len, DEFAULT_BARCODE_LEN);
        assert_eq!(cli.offset, DEFAULT_OFFSET);

        let cli = Cli::parse_from(args(&[
            "cellsieve", "--bc", "wl.tsv", "--cells", "3", "--fq", "in.fq", "-o", "out", "--tab",
            "yes",
        ]));
        assert!(!cli.table_enabled());
    }

    #[test]
    fn unparsable_cells_is_rejected() {
        let result = Cli::try_parse_from(args(&[
            "cellsieve", "--bc", "wl.tsv", "--cells", "many", "--fq", "in.fq", "-o", "out",
        ]));
        assert!(result.is_err());
    }
}
