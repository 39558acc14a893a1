use anyhow::{Context, Result};
use serde::Serialize;

/// Statistics about a single run, written as JSON when `--summary` is given.
#[derive(Serialize, Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    pub cellsieve_version: String,
    pub run_date: String,
    pub fastq_path: String,
    pub whitelist_path: String,
    pub whitelist_size: usize,
    pub read_count: usize,
    pub accepted_read_count: usize,
    pub rejected_read_count: usize,
    pub malformed_read_count: usize,
    pub barcodes_observed: usize,
    pub elapsed: f64,
}

impl RunSummary {
    pub fn new(fastq_path: &str, whitelist_path: &str) -> Self {
        RunSummary {
            cellsieve_version: crate::cli::VERSION.to_string(),
            run_date: format!("{:?}", chrono::offset::Local::now()),
            fastq_path: fastq_path.to_string(),
            whitelist_path: whitelist_path.to_string(),
            ..RunSummary::default()
        }
    }

    pub fn log(&self) {
        info!(
            "Stats: {} reads, {} kept, {} not in whitelist, {} malformed, {} barcodes observed, {:.1}s runtime",
            self.read_count,
            self.accepted_read_count,
            self.rejected_read_count,
            self.malformed_read_count,
            self.barcodes_observed,
            self.elapsed,
        )
    }

    /// Writes the summary as pretty-printed JSON to `path`.
    pub fn write_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Unable to create summary file {path}"))?;
        serde_json::to_writer_pretty(file, self).context("Could not serialize run summary")?;
        Ok(())
    }
}
