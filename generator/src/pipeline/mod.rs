//! # Generation pipeline
//!
//! Turns input records into published, signed QR codes, one record at a time.
//!
//! ## Per record:
//!
//! 1.  **Identifier**: a fresh UUID v4 is generated. The same string is used
//!     in the signed payload, the image filename, the object key and the
//!     metadata row id.
//! 2.  **Signing**: `PayloadSigner::sign` over the record and the identifier.
//! 3.  **Encoding**: `CodeEncoder::encode` renders the scan URL to PNG.
//! 4.  **Publishing**: `ArtifactPublisher::publish` writes the local copy and
//!     uploads it.
//! 5.  **Metadata**: `record_metadata` inserts the row.
//!
//! ## Failure policy
//!
//! The first failing record stops the run; later records are not attempted.
//! Artifacts already written for the failing record (local file, remote
//! object) are left in place. Progress is reported through `RunUpdate`s so
//! the caller can log or display it.

use crate::error::Result;
use crate::services::encoder::CodeEncoder;
use crate::services::metadata::{record_metadata, MetadataStore};
use crate::services::publisher::{ArtifactPublisher, PublishedArtifact};
use crate::services::signer::PayloadSigner;
use common::jobs::RunStatus;
use common::model::qr_code::MetadataRecord;
use common::model::record::SourceRecord;
use log::{debug, info};
use uuid::Uuid;

/// Progress reported while a run is executing.
#[derive(Debug, Clone, PartialEq)]
pub enum RunUpdate {
    /// Overall status of the run.
    Run(RunStatus),
    /// A record finished every stage.
    Record { row_index: usize, unique_id: String },
}

/// Everything produced for one input record.
#[derive(Debug, Clone)]
pub struct ProcessedRecord {
    pub unique_id: String,
    pub scan_url: String,
    pub artifact: PublishedArtifact,
    pub metadata: MetadataRecord,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub processed: Vec<ProcessedRecord>,
}

pub struct Pipeline<'a> {
    signer: PayloadSigner,
    encoder: CodeEncoder,
    publisher: ArtifactPublisher<'a>,
    metadata: &'a dyn MetadataStore,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        signer: PayloadSigner,
        encoder: CodeEncoder,
        publisher: ArtifactPublisher<'a>,
        metadata: &'a dyn MetadataStore,
    ) -> Self {
        Self {
            signer,
            encoder,
            publisher,
            metadata,
        }
    }

    /// Runs every stage for a single record under a newly generated identifier.
    pub fn process_record(&self, record: &SourceRecord) -> Result<ProcessedRecord> {
        let unique_id = Uuid::new_v4().to_string();
        info!(
            "Generating QR code {} for store {} item {}",
            unique_id, record.store_id, record.item_id
        );

        let payload = self.signer.sign(record, &unique_id)?;
        debug!("Data to sign: {}", payload.data_to_sign());
        debug!("Generated signature: {}", payload.signature());

        let scan_url = self.encoder.scan_url(&payload);
        let image = self.encoder.encode(&payload)?;
        debug!("Encoded {} ({} PNG bytes)", scan_url, image.png.len());

        let artifact = self.publisher.publish(&image.png, &unique_id)?;
        let metadata = record_metadata(self.metadata, record, &unique_id)?;

        Ok(ProcessedRecord {
            unique_id,
            scan_url,
            artifact,
            metadata,
        })
    }

    /// Processes `records` in order, stopping at the first error.
    ///
    /// # Arguments
    /// * `records` - The record source; a read error counts as a failed record.
    /// * `on_update` - Receives a `RunUpdate` when the run starts, after every
    ///   finished record, and when the run completes or fails.
    ///
    /// # Returns
    /// The processed records on success, or the first error encountered.
    pub fn run<I>(&self, records: I, on_update: &mut dyn FnMut(RunUpdate)) -> Result<RunSummary>
    where
        I: IntoIterator<Item = Result<SourceRecord>>,
    {
        on_update(RunUpdate::Run(RunStatus::InProgress(0)));
        let mut summary = RunSummary::default();

        for (row_index, record) in records.into_iter().enumerate() {
            let outcome = record.and_then(|record| self.process_record(&record));
            match outcome {
                Ok(processed) => {
                    on_update(RunUpdate::Record {
                        row_index,
                        unique_id: processed.unique_id.clone(),
                    });
                    summary.processed.push(processed);
                    on_update(RunUpdate::Run(RunStatus::InProgress(
                        summary.processed.len() as u32,
                    )));
                }
                Err(err) => {
                    on_update(RunUpdate::Run(RunStatus::Failed(format!(
                        "record {} failed: {}",
                        row_index + 1,
                        err
                    ))));
                    return Err(err);
                }
            }
        }

        on_update(RunUpdate::Run(RunStatus::Completed(format!(
            "{} QR code(s) generated",
            summary.processed.len()
        ))));
        Ok(summary)
    }
}
