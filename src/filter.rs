use thiserror::Error;

use crate::cli::ConfigError;
use crate::io::Record;
use crate::whitelist::Whitelist;

/// Length of the cell barcode at the start of each read.
pub const DEFAULT_BARCODE_LEN: usize = 20;

/// Number of leading bases covering the barcode and the UMI which follows it.
pub const DEFAULT_OFFSET: usize = 28;

/// Where the barcode ends and where the kept part of the read begins.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ReadLayout {
    barcode_len: usize,
    offset: usize,
}

impl ReadLayout {
    /// Validates that the barcode is non-empty and strictly shorter than the trimmed prefix.
    pub fn new(barcode_len: usize, offset: usize) -> Result<Self, ConfigError> {
        if barcode_len == 0 || offset <= barcode_len {
            return Err(ConfigError::InvalidLayout { barcode_len, offset });
        }
        Ok(ReadLayout { barcode_len, offset })
    }

    pub fn barcode_len(&self) -> usize {
        self.barcode_len
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Default for ReadLayout {
    fn default() -> Self {
        ReadLayout {
            barcode_len: DEFAULT_BARCODE_LEN,
            offset: DEFAULT_OFFSET,
        }
    }
}

/// A read which cannot be split into barcode, UMI and remainder.
#[derive(Error, Debug, PartialEq)]
pub enum ReadError {
    #[error("read `{id}` is too short: {len} bases, but at least {offset} are required")]
    TooShort { id: String, len: usize, offset: usize },
}

/// A whitelisted read with the barcode and UMI removed. Borrows from the input `Record`.
#[derive(Debug, PartialEq)]
pub struct FilteredRecord<'a> {
    pub id: &'a [u8],
    pub barcode: &'a str,
    pub seq: &'a [u8],
    pub qual: &'a [u8],
}

impl FilteredRecord<'_> {
    /// The output id, `<original id>_<barcode>`.
    pub fn new_id(&self) -> Vec<u8> {
        [self.id, &b"_"[..], self.barcode.as_bytes()].concat()
    }
}

/// What happened to a single read.
#[derive(Debug, PartialEq)]
pub enum Outcome<'a> {
    Accepted(FilteredRecord<'a>),
    Rejected,
}

/// Tests the leading barcode of `read` against `whitelist` and, on a match, trims the first
/// `layout.offset()` bases from both the sequence and the quality.
///
/// Bytes are compared as they are. A barcode which is not valid UTF-8 cannot be in the
/// whitelist, so such a read is rejected like any other unknown barcode.
///
/// # Errors
///
/// Returns a `ReadError` if the sequence or quality is shorter than the layout's offset. The
/// caller should skip the read and carry on.
pub fn classify<'a>(
    read: &'a Record,
    whitelist: &Whitelist,
    layout: &ReadLayout,
) -> Result<Outcome<'a>, ReadError> {
    let offset = layout.offset();

    // the parser guarantees equal lengths, but a hand-built record may not
    let len = read.seq.len().min(read.qual.len());
    if len < offset {
        return Err(ReadError::TooShort {
            id: String::from_utf8_lossy(&read.id).into_owned(),
            len,
            offset,
        });
    }

    let barcode = match std::str::from_utf8(&read.seq[..layout.barcode_len()]) {
        Ok(bc) if whitelist.contains(bc) => bc,
        _ => return Ok(Outcome::Rejected),
    };

    Ok(Outcome::Accepted(FilteredRecord {
        id: &read.id,
        barcode,
        seq: &read.seq[offset..],
        qual: &read.qual[offset..],
    }))
}
