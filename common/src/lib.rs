//! Types shared between the QR generator and anything that consumes its output.
//!
//! - `model`: the input row, the signed payload carried in the scan URL and the
//!   metadata row persisted for every generated code.
//! - `jobs`: the status reported while a generation run is in progress.

pub mod jobs;
pub mod model;
