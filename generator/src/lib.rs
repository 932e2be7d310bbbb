//! Signed QR code generator.
//!
//! Reads store/item rows from a CSV file and, for each row, signs a scan
//! payload, renders it as a QR code, stores the PNG locally and in object
//! storage, and records the code's metadata.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod services;
