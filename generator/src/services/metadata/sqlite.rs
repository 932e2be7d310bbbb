use crate::config::is_valid_identifier;
use crate::error::{GeneratorError, Result};
use crate::services::metadata::MetadataStore;
use common::model::qr_code::MetadataRecord;
use rusqlite::{params, Connection};
use std::path::Path;

/// Local stand-in for the hosted table, selected with `--metadata-backend sqlite`.
///
/// The table is created on open if it does not exist. `location` holds the
/// WKT text of the point.
pub struct SqliteMetadataStore {
    conn: Connection,
    table: String,
}

impl SqliteMetadataStore {
    pub fn open(path: &Path, table: &str) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| setup_error(table, e))?;
        Self::with_connection(conn, table)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory(table: &str) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| setup_error(table, e))?;
        Self::with_connection(conn, table)
    }

    fn with_connection(conn: Connection, table: &str) -> Result<Self> {
        if !is_valid_identifier(table) {
            return Err(GeneratorError::Config(format!(
                "invalid table name {table:?}"
            )));
        }
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY,
                store_id INTEGER NOT NULL,
                banner_id INTEGER NOT NULL,
                item_id INTEGER NOT NULL,
                location TEXT NOT NULL,
                campaign_id INTEGER
            )"
        ))
        .map_err(|e| setup_error(table, e))?;
        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }
}

impl MetadataStore for SqliteMetadataStore {
    fn insert(&self, row: &MetadataRecord) -> Result<()> {
        self.conn
            .execute(
                &format!(
                    "INSERT INTO {} (id, store_id, banner_id, item_id, location, campaign_id)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    self.table
                ),
                params![
                    row.id,
                    row.store_id,
                    row.banner_id,
                    row.item_id,
                    row.location.to_wkt(),
                    row.campaign_id
                ],
            )
            .map_err(|e| GeneratorError::Metadata {
                id: row.id.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }
}

fn setup_error(table: &str, err: rusqlite::Error) -> GeneratorError {
    GeneratorError::Metadata {
        id: format!("<{table} setup>"),
        message: err.to_string(),
    }
}
