//! Metadata recorder: one row per generated code.
//!
//! Rows are inserted, never updated. A duplicate id is left to the backing
//! store's constraints and surfaces as `GeneratorError::Metadata`.
//!
//! - `supabase`: PostgREST insert into the `qr_codes` table.
//! - `sqlite`: local SQLite table with the same columns.

pub mod sqlite;
pub mod supabase;

use crate::error::Result;
use common::model::qr_code::MetadataRecord;
use common::model::record::SourceRecord;
use log::info;

pub trait MetadataStore {
    fn insert(&self, row: &MetadataRecord) -> Result<()>;
}

/// Builds the row for `record` under `unique_id` and inserts it.
pub fn record_metadata(
    store: &dyn MetadataStore,
    record: &SourceRecord,
    unique_id: &str,
) -> Result<MetadataRecord> {
    let row = MetadataRecord::new(record, unique_id);
    store.insert(&row)?;
    info!("Metadata stored for QR ID: {}", unique_id);
    Ok(row)
}
