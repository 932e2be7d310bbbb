use crate::error::{GeneratorError, Result};
use crate::services::metadata::MetadataStore;
use crate::services::supabase::SupabaseClient;
use common::model::qr_code::MetadataRecord;

/// A table exposed through the project's PostgREST API.
pub struct SupabaseTable {
    client: SupabaseClient,
    table: String,
}

impl SupabaseTable {
    pub fn new(client: SupabaseClient, table: &str) -> Self {
        Self {
            client,
            table: table.to_string(),
        }
    }
}

impl MetadataStore for SupabaseTable {
    fn insert(&self, row: &MetadataRecord) -> Result<()> {
        self.client
            .insert_row(&self.table, row)
            .map_err(|e| GeneratorError::Metadata {
                id: row.id.clone(),
                message: e.to_string(),
            })
    }
}
