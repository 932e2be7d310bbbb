//! Record source: the input rows the generator turns into QR codes.
//!
//! - `csv`: reads `SourceRecord`s from a headered CSV file.

pub mod csv;

pub use self::csv::CsvRecordSource;
