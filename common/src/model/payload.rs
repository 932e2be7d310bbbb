//! The signed payload carried in the `d` query parameter of every scan URL.
//!
//! Wire format, seven fields joined by `|`:
//!
//! ```text
//! store_id|banner_id|item_id|lat|lng|unique_id|hex_signature
//! ```
//!
//! The first six fields form the signed string. The unique id is part of it,
//! so a signature cannot be replayed under a different generated code.

use crate::model::record::{format_coordinate, SourceRecord};
use std::fmt;
use thiserror::Error;

/// Separator between payload fields.
pub const FIELD_DELIMITER: char = '|';

/// Number of fields in a complete payload, signature included.
pub const PAYLOAD_FIELDS: usize = 7;

/// Builds the canonical string that gets signed for `record` under `unique_id`.
pub fn data_to_sign(record: &SourceRecord, unique_id: &str) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}",
        record.store_id,
        record.banner_id,
        record.item_id,
        format_coordinate(record.lat),
        format_coordinate(record.lng),
        unique_id
    )
}

/// A signed string plus its lowercase hex HMAC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPayload {
    data_to_sign: String,
    signature: String,
}

impl SignedPayload {
    pub fn new(data_to_sign: String, signature: String) -> Self {
        Self {
            data_to_sign,
            signature,
        }
    }

    /// The exact text the signature was computed over.
    pub fn data_to_sign(&self) -> &str {
        &self.data_to_sign
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// The generated identifier, i.e. the last signed field.
    pub fn unique_id(&self) -> &str {
        self.data_to_sign
            .rsplit_once(FIELD_DELIMITER)
            .map(|(_, id)| id)
            .unwrap_or(&self.data_to_sign)
    }

    /// Parses the value of a scan URL's `d` parameter.
    ///
    /// The signed part is kept verbatim so it can be re-verified byte for byte.
    pub fn parse(raw: &str) -> Result<Self, PayloadError> {
        let fields: Vec<&str> = raw.split(FIELD_DELIMITER).collect();
        if fields.len() != PAYLOAD_FIELDS {
            return Err(PayloadError::FieldCount {
                expected: PAYLOAD_FIELDS,
                found: fields.len(),
            });
        }
        if let Some(index) = fields.iter().position(|f| f.is_empty()) {
            return Err(PayloadError::EmptyField(index));
        }
        match raw.rsplit_once(FIELD_DELIMITER) {
            Some((data, signature)) => Ok(Self::new(data.to_string(), signature.to_string())),
            None => Err(PayloadError::FieldCount {
                expected: PAYLOAD_FIELDS,
                found: 1,
            }),
        }
    }
}

impl fmt::Display for SignedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.data_to_sign, FIELD_DELIMITER, self.signature)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("payload must have {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error("payload field {0} is empty")]
    EmptyField(usize),
}
