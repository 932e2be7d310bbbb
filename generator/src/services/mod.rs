//! Building blocks of the generation pipeline.
//!
//! ## Sub-modules:
//! - `records`: reads input rows.
//! - `signer`: HMAC-signs the scan payload.
//! - `encoder`: renders the scan URL as a QR code PNG.
//! - `publisher`: writes the PNG to disk and to the object store.
//! - `metadata`: inserts the metadata row.
//! - `supabase`: HTTP handle shared by the hosted storage and table backends.

pub mod encoder;
pub mod metadata;
pub mod publisher;
pub mod records;
pub mod signer;
pub mod supabase;
