use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};

use anyhow::{Context, Result};

/// The set of accepted cell barcodes. Built once, before any reads are processed, and never
/// modified afterwards.
#[derive(Debug, Default)]
pub struct Whitelist {
    barcodes: HashSet<String>,
}

impl Whitelist {
    /// Loads at most `cells` lines from the whitelist file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or a line cannot be read.
    pub fn from_path(path: &str, cells: usize) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Unable to open whitelist {path}"))?;
        let whitelist = Self::from_reader(BufReader::new(file), cells)
            .with_context(|| format!("Unable to read whitelist {path}"))?;

        info!("barcode number: {}", whitelist.len());
        Ok(whitelist)
    }

    /// Reads at most `cells` lines from `reader`, inserting the first tab-separated field of
    /// each line. A line without a tab is used whole. Every line consumed counts towards
    /// `cells`, including duplicates and blank lines, so the resulting set may hold fewer
    /// than `cells` barcodes.
    pub fn from_reader(reader: impl BufRead, cells: usize) -> std::io::Result<Self> {
        let mut barcodes = HashSet::new();

        for line in reader.lines().take(cells) {
            let line = line?;
            let barcode = first_field(&line);
            if !barcode.is_empty() {
                barcodes.insert(barcode.to_string());
            }
        }

        Ok(Whitelist { barcodes })
    }

    pub fn contains(&self, barcode: &str) -> bool {
        self.barcodes.contains(barcode)
    }

    pub fn len(&self) -> usize {
        self.barcodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.barcodes.is_empty()
    }

    /// The number of barcodes which are not `len` characters long. These can never match a
    /// read, since reads are always sliced to exactly `len` bytes.
    pub fn count_mismatched_lengths(&self, len: usize) -> usize {
        self.barcodes.iter().filter(|bc| bc.len() != len).count()
    }
}

/// Returns the text before the first tab, or the whole line if there is none. A trailing
/// carriage return is dropped first.
fn first_field(line: &str) -> &str {
    let line = line.strip_suffix('\r').unwrap_or(line);
    match line.split_once('\t') {
        Some((field, _)) => field,
        None => line,
    }
}
