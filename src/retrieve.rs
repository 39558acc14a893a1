use std::io::Write;

use anyhow::{Context, Result};

use crate::counts::CountTable;
use crate::filter::{classify, Outcome, ReadLayout};
use crate::io::{self, Record};
use crate::summary::RunSummary;
use crate::whitelist::Whitelist;

/// How often a progress message is logged, in reads.
const PROGRESS_INTERVAL: usize = 1_000_000;

pub struct RetrieveOpts {
    pub whitelist: String,
    pub cells: usize,
    pub fastq: String,
    pub prefix: String,
    pub table: bool,
    pub layout: ReadLayout,
    pub summary: Option<String>,
}

pub fn fastq_output_path(prefix: &str) -> String {
    format!("{prefix}_final.fq")
}

pub fn table_output_path(prefix: &str) -> String {
    format!("{prefix}_UMI_counts.tsv")
}

/// Owns all state of a single pass over the reads: the whitelist (read only), the per-barcode
/// counts and the running statistics.
pub struct Pipeline {
    whitelist: Whitelist,
    layout: ReadLayout,
    counts: CountTable,
    summary: RunSummary,
}

impl Pipeline {
    pub fn new(whitelist: Whitelist, layout: ReadLayout, mut summary: RunSummary) -> Self {
        summary.whitelist_size = whitelist.len();
        Pipeline {
            whitelist,
            layout,
            counts: CountTable::new(),
            summary,
        }
    }

    /// Consumes `reads` once, writing every whitelisted read to `writer` in input order with its
    /// barcode and UMI trimmed off.
    ///
    /// Reads which are too short to contain the barcode and UMI are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Stops at the first error yielded by `reads`, or the first failed write.
    pub fn run(
        &mut self,
        reads: impl Iterator<Item=Result<Record>>,
        writer: &mut impl Write,
    ) -> Result<()> {
        for read in reads {
            let read = read?;
            self.summary.read_count += 1;

            if self.summary.read_count % PROGRESS_INTERVAL == 0 {
                info!("Processed: {}", self.summary.read_count)
            }

            match classify(&read, &self.whitelist, &self.layout) {
                Ok(Outcome::Accepted(rec)) => {
                    io::write_read(writer, &rec.new_id(), rec.seq, rec.qual)
                        .context("Could not write read")?;
                    self.counts.increment(rec.barcode);
                    self.summary.accepted_read_count += 1;
                }
                Ok(Outcome::Rejected) => {
                    self.summary.rejected_read_count += 1;
                }
                Err(e) => {
                    warn!("Skipping read {}: {}", self.summary.read_count, e);
                    self.summary.malformed_read_count += 1;
                }
            }
        }

        self.summary.barcodes_observed = self.counts.len();
        debug_assert_eq!(self.counts.total(), self.summary.accepted_read_count);
        Ok(())
    }

    pub fn counts(&self) -> &CountTable {
        &self.counts
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }
}

/// Runs the whole retrieval: loads the whitelist, filters and trims the reads into
/// `<prefix>_final.fq`, then optionally writes the ranked counts to `<prefix>_UMI_counts.tsv`.
///
/// The whitelist and input are opened before any output file is created, so a missing input
/// leaves nothing behind.
///
/// # Errors
///
/// Returns an error if any input cannot be read, any output cannot be written, or the input
/// contains a record which cannot be parsed.
pub fn retrieve(opts: &RetrieveOpts) -> Result<RunSummary> {
    let now = std::time::Instant::now();

    let whitelist = Whitelist::from_path(&opts.whitelist, opts.cells)?;
    if whitelist.is_empty() {
        warn!("The whitelist is empty, so no reads will be kept");
    }
    let mismatched = whitelist.count_mismatched_lengths(opts.layout.barcode_len());
    if mismatched > 0 {
        warn!(
            "{mismatched} whitelist entries are not {} characters long and will never match",
            opts.layout.barcode_len()
        );
    }

    let reader = io::open_fastq(&opts.fastq)?;

    let fastq_out = fastq_output_path(&opts.prefix);
    let mut writer = io::create_writer(&fastq_out)?;

    let mut pipeline = Pipeline::new(
        whitelist,
        opts.layout,
        RunSummary::new(&opts.fastq, &opts.whitelist),
    );
    pipeline
        .run(io::records(reader), &mut writer)
        .with_context(|| format!("Failed while processing {}", opts.fastq))?;
    writer
        .flush()
        .with_context(|| format!("Unable to write to {fastq_out}"))?;
    info!("Wrote reads to {fastq_out}");

    let counts = pipeline.counts();
    if counts.is_empty() {
        warn!("No reads matched the whitelist");
    }

    if opts.table {
        let table_out = table_output_path(&opts.prefix);
        let table_writer = io::create_writer(&table_out)?;
        counts
            .write_ranked(table_writer)
            .with_context(|| format!("Unable to write to {table_out}"))?;
        info!("Wrote counts for {} barcodes to {table_out}", counts.len());
    }

    let mut summary = pipeline.summary().clone();
    summary.elapsed = now.elapsed().as_secs_f64();
    summary.log();

    if let Some(path) = &opts.summary {
        summary.write_json(path)?;
    }

    Ok(summary)
}
