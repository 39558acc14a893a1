use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use needletail::parser::{FastqReader, SequenceRecord};
use needletail::FastxReader;

/// A single FASTQ read, kept as raw bytes. The id excludes the leading `@`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: Vec<u8>,
    pub seq: Vec<u8>,
    pub qual: Vec<u8>,
}

impl<'a> From<SequenceRecord<'a>> for Record {
    fn from(rec: SequenceRecord<'a>) -> Self {
        Record {
            id: rec.id().to_vec(),
            seq: rec.seq().to_vec(),
            qual: rec.qual().unwrap_or(&[]).to_vec(),
        }
    }
}

/// Opens a .fastq file for streaming. Files ending in `.gz` are decompressed on the fly.
///
/// # Errors
///
/// Returns an error if the file cannot be opened.
pub fn open_fastq(path: &str) -> Result<FastqReader<Box<dyn Read + Send>>> {
    let file = File::open(path).with_context(|| format!("Unable to open file {path}"))?;

    let inner: Box<dyn Read + Send> = if path.ends_with(".gz") {
        Box::new(MultiGzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(file)
    };

    Ok(FastqReader::new(inner))
}

/// Lazily yields every record of a FASTQ stream exactly once, converting each into a `Record`.
/// The iterator yields `Err` for records which the parser rejects; the caller should stop at
/// the first error.
pub fn records<R: Read + Send>(
    mut reader: FastqReader<R>,
) -> impl Iterator<Item=Result<Record>> {
    let mut n = 0usize;
    std::iter::from_fn(move || {
        let rec = reader.next()?;
        n += 1;
        Some(
            rec.map(Record::from)
                .with_context(|| format!("Invalid FASTQ record (read {n})")),
        )
    })
}

/// Creates a buffered writer for an output file.
pub fn create_writer(path: &str) -> Result<BufWriter<File>> {
    let file = File::create(Path::new(path))
        .with_context(|| format!("Unable to create output file {path}"))?;
    Ok(BufWriter::new(file))
}

/// Formats a record as a four line FASTQ entry and writes it to `writer`.
///
/// # Arguments
///
/// * `writer` - Any `std::io::Write`. For in-memory output, use a `std::io::Cursor` or a
///   `Vec<u8>`.
/// * `id` - The read identifier, without the leading `@`.
/// * `seq` - The sequence line.
/// * `qual` - The quality line.
pub fn write_read(
    writer: &mut impl Write,
    id: &[u8],
    seq: &[u8],
    qual: &[u8],
) -> std::io::Result<()> {
    writer.write_all(b"@")?;
    writer.write_all(id)?;
    writer.write_all(b"\n")?;
    writer.write_all(seq)?;
    writer.write_all(b"\n+\n")?;
    writer.write_all(qual)?;
    writer.write_all(b"\n")
}
