use std::collections::HashMap;
use std::io::Write;

use anyhow::{Context, Result};
use itertools::Itertools;

/// Number of accepted reads per barcode. Only barcodes with at least one accepted read
/// are present.
#[derive(Debug, Default)]
pub struct CountTable {
    counts: HashMap<String, usize>,
}

impl CountTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, barcode: &str) {
        match self.counts.get_mut(barcode) {
            Some(x) => *x += 1,
            None => {
                self.counts.insert(barcode.to_string(), 1);
            }
        }
    }

    #[cfg(test)]
    pub fn get(&self, barcode: &str) -> usize {
        self.counts.get(barcode).copied().unwrap_or(0)
    }

    /// The number of distinct barcodes seen.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The sum of all counts, equal to the number of reads written.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Returns every (barcode, count) pair, sorted by count from highest to lowest. Barcodes
    /// with equal counts are ordered lexically so the output is the same on every run.
    pub fn ranked(&self) -> Vec<(&str, usize)> {
        self.counts
            .iter()
            .map(|(bc, n)| (bc.as_str(), *n))
            .sorted_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
            .collect()
    }

    /// Writes the ranked table as `barcode<TAB>count` lines, without a header.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `writer` fails.
    pub fn write_ranked<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(writer);

        for row in self.ranked() {
            wtr.serialize(row).context("Could not write count table row")?;
        }

        wtr.flush()?;
        Ok(())
    }
}
