use crate::tsv::{FromTsvRow, error::TsvError};
use csv::{ReaderBuilder, StringRecordsIntoIter};
use std::{fs::File, marker::PhantomData, path::Path};
use tracing::warn;

/// A line that could not be parsed into a source record. Reported alongside
/// the good rows so the step can count it as a read skip without aborting.
#[derive(Debug, Clone)]
pub struct ParseFailure {
    pub line: u64,
    pub message: String,
}

/// Result of draining one chunk from the source stream.
#[derive(Debug)]
pub struct TsvFetch<R> {
    pub records: Vec<R>,
    pub failures: Vec<ParseFailure>,
    pub reached_end: bool,
}

/// Chunked reader over a tab-delimited legacy export.
///
/// One header row is skipped; records are yielded in file order. Lines that
/// fail to parse are reported, not fatal — only underlying I/O errors abort
/// the stream.
pub struct TsvSource<R> {
    iter: StringRecordsIntoIter<File>,
    /// 1-based line number of the next data row (header is line 1).
    line: u64,
    exhausted: bool,
    _marker: PhantomData<R>,
}

impl<R: FromTsvRow> TsvSource<R> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TsvError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| TsvError::Open {
            path: path.display().to_string(),
            source,
        })?;

        let reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        Ok(TsvSource {
            iter: reader.into_records(),
            line: 1,
            exhausted: false,
            _marker: PhantomData,
        })
    }

    /// Reads up to `chunk_size` records, collecting per-line parse failures.
    pub fn fetch(&mut self, chunk_size: usize) -> Result<TsvFetch<R>, TsvError> {
        let mut records = Vec::with_capacity(chunk_size);
        let mut failures = Vec::new();

        while records.len() < chunk_size {
            match self.iter.next() {
                Some(Ok(raw)) => {
                    self.line += 1;
                    match R::from_row(&raw) {
                        Ok(record) => records.push(record),
                        Err(message) => {
                            warn!(line = self.line, %message, "Skipping unparseable line");
                            failures.push(ParseFailure {
                                line: self.line,
                                message,
                            });
                        }
                    }
                }
                Some(Err(err)) => {
                    self.line += 1;
                    if err.is_io_error() {
                        return Err(TsvError::Read(err));
                    }
                    // Encoding/shape problems are line-scoped.
                    warn!(line = self.line, error = %err, "Skipping unreadable line");
                    failures.push(ParseFailure {
                        line: self.line,
                        message: err.to_string(),
                    });
                }
                None => {
                    self.exhausted = true;
                    break;
                }
            }
        }

        Ok(TsvFetch {
            records,
            failures,
            reached_end: self.exhausted,
        })
    }
}

/// Counts data rows (excluding the header) without parsing fields.
/// Used by the pre-flight check.
pub fn count_data_rows(path: impl AsRef<Path>) -> Result<u64, TsvError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| TsvError::Open {
        path: path.display().to_string(),
        source,
    })?;

    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let mut count = 0u64;
    let mut record = csv::StringRecord::new();
    while reader.read_record(&mut record)? {
        count += 1;
    }
    Ok(count)
}
