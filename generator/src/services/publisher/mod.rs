//! Persists rendered codes: one copy on local disk, one in the object store.
//!
//! Both copies use the name `qr_{unique_id}.png`. The local write happens
//! first; if the upload then fails the local file stays where it is. Nothing
//! is retried or rolled back.
//!
//! - `supabase`: `ObjectStore` backed by a Supabase Storage bucket.

pub mod supabase;

use crate::error::{GeneratorError, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Remote key-addressed binary storage.
pub trait ObjectStore {
    /// Stores `bytes` under `key`. Errors are reported as `GeneratorError::Upload`.
    fn put_object(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()>;
}

/// File name shared by the local copy and the remote object.
pub fn artifact_file_name(unique_id: &str) -> String {
    format!("qr_{unique_id}.png")
}

/// Where a code ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedArtifact {
    pub local_path: PathBuf,
    pub object_key: String,
}

pub struct ArtifactPublisher<'a> {
    output_dir: PathBuf,
    store: &'a dyn ObjectStore,
}

impl<'a> ArtifactPublisher<'a> {
    pub fn new(output_dir: impl Into<PathBuf>, store: &'a dyn ObjectStore) -> Self {
        Self {
            output_dir: output_dir.into(),
            store,
        }
    }

    /// Writes `png` locally, then uploads the same bytes.
    pub fn publish(&self, png: &[u8], unique_id: &str) -> Result<PublishedArtifact> {
        let file_name = artifact_file_name(unique_id);

        fs::create_dir_all(&self.output_dir).map_err(|source| GeneratorError::LocalWrite {
            path: self.output_dir.clone(),
            source,
        })?;
        let local_path = self.output_dir.join(&file_name);
        fs::write(&local_path, png).map_err(|source| GeneratorError::LocalWrite {
            path: local_path.clone(),
            source,
        })?;
        info!("QR code saved locally to: {}", local_path.display());

        self.store.put_object(&file_name, png, PNG_CONTENT_TYPE)?;
        info!("Uploaded QR code as {}", file_name);

        Ok(PublishedArtifact {
            local_path,
            object_key: file_name,
        })
    }
}
