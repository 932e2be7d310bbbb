use crate::error::{GeneratorError, Result};
use crate::services::publisher::ObjectStore;
use crate::services::supabase::SupabaseClient;

/// A Supabase Storage bucket.
pub struct SupabaseStorage {
    client: SupabaseClient,
    bucket: String,
}

impl SupabaseStorage {
    pub fn new(client: SupabaseClient, bucket: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
        }
    }
}

impl ObjectStore for SupabaseStorage {
    fn put_object(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()> {
        self.client
            .upload_object(&self.bucket, key, bytes.to_vec(), content_type)
            .map_err(|e| GeneratorError::Upload {
                key: format!("{}/{}", self.bucket, key),
                message: e.to_string(),
            })
    }
}
