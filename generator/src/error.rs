use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop a generation run.
///
/// `Config` is only produced before the first record is read. Every other
/// variant belongs to a single record and aborts the run at that record.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("cannot read input {path}: {message}")]
    InputOpen { path: PathBuf, message: String },

    #[error("invalid input at line {line}: {message}")]
    Input { line: u64, message: String },

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("QR encoding failed: {0}")]
    Encoding(String),

    #[error("failed to write {path}: {source}")]
    LocalWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("upload of {key} failed: {message}")]
    Upload { key: String, message: String },

    #[error("metadata insert for {id} failed: {message}")]
    Metadata { id: String, message: String },
}

pub type Result<T> = std::result::Result<T, GeneratorError>;
