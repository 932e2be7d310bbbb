//! HMAC-SHA256 signing of scan payloads.
//!
//! The signature is computed over `store_id|banner_id|item_id|lat|lng|unique_id`
//! and rendered as lowercase hex. Whoever scans the code recomputes it with the
//! same shared secret.

use crate::config::Secret;
use crate::error::{GeneratorError, Result};
use common::model::payload::{self, SignedPayload};
use common::model::record::SourceRecord;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub struct PayloadSigner {
    key: Secret,
}

impl PayloadSigner {
    pub fn new(key: Secret) -> Self {
        Self { key }
    }

    /// Signs `record` under the freshly generated `unique_id`.
    pub fn sign(&self, record: &SourceRecord, unique_id: &str) -> Result<SignedPayload> {
        let data_to_sign = payload::data_to_sign(record, unique_id);
        let mut mac = self.mac()?;
        mac.update(data_to_sign.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());
        Ok(SignedPayload::new(data_to_sign, signature))
    }

    /// Checks `payload` against this key. The comparison is constant time.
    pub fn verify(&self, payload: &SignedPayload) -> bool {
        let Ok(expected) = hex::decode(payload.signature()) else {
            return false;
        };
        let Ok(mut mac) = self.mac() else {
            return false;
        };
        mac.update(payload.data_to_sign().as_bytes());
        mac.verify_slice(&expected).is_ok()
    }

    fn mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(self.key.expose().as_bytes())
            .map_err(|e| GeneratorError::Signing(e.to_string()))
    }
}
