use crate::error::{GeneratorError, Result};
use common::model::record::{SourceRecord, REQUIRED_COLUMNS};
use csv::{Reader, ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Streams `SourceRecord`s out of a CSV file, in file order.
///
/// The header is checked when the source is opened, so a file missing one of
/// the required columns fails before any record is handed out. Cells and
/// header titles are trimmed; extra columns are ignored. Coordinates are
/// range-checked per row.
pub struct CsvRecordSource<R: Read> {
    reader: Reader<R>,
    headers: StringRecord,
}

impl CsvRecordSource<File> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| GeneratorError::InputOpen {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_reader(file)
    }
}

impl<R: Read> CsvRecordSource<R> {
    pub fn from_reader(inner: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(inner);
        let headers = reader.headers().map_err(input_error)?.clone();
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| !headers.iter().any(|h| h == *column))
            .collect();
        if !missing.is_empty() {
            return Err(GeneratorError::Input {
                line: 1,
                message: format!("header is missing column(s): {}", missing.join(", ")),
            });
        }
        Ok(Self { reader, headers })
    }

    /// Yields one result per data row. A malformed row, or one whose
    /// coordinates are not finite or out of range, yields an `Input` error
    /// carrying its line number.
    pub fn records(&mut self) -> impl Iterator<Item = Result<SourceRecord>> + '_ {
        let headers = &self.headers;
        self.reader.records().map(move |row| {
            let row = row.map_err(input_error)?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);
            let record: SourceRecord = row
                .deserialize(Some(headers))
                .map_err(|e| GeneratorError::Input {
                    line,
                    message: e.to_string(),
                })?;
            record.check_coordinates().map_err(|e| GeneratorError::Input {
                line,
                message: e.to_string(),
            })?;
            Ok(record)
        })
    }
}

fn input_error(err: csv::Error) -> GeneratorError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    GeneratorError::Input {
        line,
        message: err.to_string(),
    }
}
