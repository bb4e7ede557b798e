//! Batch staging for documents over the online page ceiling.
//!
//! Stages the raw upload in durable storage, submits an asynchronous
//! extraction job, merges the sharded output in shard-name order, and
//! removes the staged objects on a best-effort basis.

use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::services::extractor::{ExtractionResult, ProcessingMethod};
use crate::services::object_stage::ObjectStage;
use crate::services::ocr_client::{OcrClient, OcrDocument, OcrError};

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to stage document: {0}")]
    Stage(#[from] opendal::Error),

    #[error("batch job submission failed: {0}")]
    Submit(#[source] OcrError),

    #[error("batch job did not complete within {0:?}")]
    Timeout(Duration),

    #[error("batch job failed: {0}")]
    Job(#[source] OcrError),

    #[error("batch job produced no output shards under {prefix}")]
    NoOutput { prefix: String },

    #[error("failed to parse output shard {key}: {source}")]
    ShardParse {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result of the best-effort cleanup pass. Never surfaces as an error; a
/// stranded blob is a degraded outcome, not a failed extraction.
#[derive(Debug, Default)]
pub struct CleanupOutcome {
    pub deleted: usize,
    pub failed: usize,
}

impl CleanupOutcome {
    pub fn degraded(&self) -> bool {
        self.failed > 0
    }
}

pub struct BatchStager<'a> {
    ocr: &'a dyn OcrClient,
    stage: &'a ObjectStage,
    timeout: Duration,
}

impl<'a> BatchStager<'a> {
    pub fn new(ocr: &'a dyn OcrClient, stage: &'a ObjectStage, timeout: Duration) -> Self {
        Self {
            ocr,
            stage,
            timeout,
        }
    }

    pub async fn batch_extract(
        &self,
        content: &[u8],
        filename: &str,
    ) -> Result<ExtractionResult, BatchError> {
        // Timestamp plus nanoseconds keeps concurrent attempts from
        // colliding on staged object names.
        let stamp = Utc::now().format("%Y%m%d-%H%M%S%f").to_string();
        let input_key = format!("input-{}.pdf", stamp);
        let output_prefix = format!("output-{}", stamp);

        info!(filename, input_key, output_prefix, "Starting batch extraction");

        self.stage.put_input(&input_key, content.to_vec()).await?;

        let input_uri = self.stage.input_uri(&input_key);
        let output_uri = self.stage.output_uri(&output_prefix);

        let mut job = self
            .ocr
            .submit_batch(&input_uri, &output_uri)
            .await
            .map_err(BatchError::Submit)?;

        // Hard ceiling on the wait; dropping the future on timeout also
        // abandons the poll loop, so a caller-side cancellation propagates.
        match tokio::time::timeout(self.timeout, job.wait()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(BatchError::Job(e)),
            Err(_) => return Err(BatchError::Timeout(self.timeout)),
        }

        let listed = self.stage.list_output(&format!("{}/", output_prefix)).await?;
        let mut shard_keys: Vec<String> = listed
            .iter()
            .filter(|k| k.ends_with(".json"))
            .cloned()
            .collect();

        if shard_keys.is_empty() {
            return Err(BatchError::NoOutput {
                prefix: output_prefix,
            });
        }

        // Shard name order is page order; discovery order is not.
        shard_keys.sort();

        let mut full_text = String::new();
        let mut page_count = 0usize;

        for key in &shard_keys {
            let bytes = self.stage.get_output(key).await?;
            let shard: OcrDocument =
                serde_json::from_slice(&bytes).map_err(|source| BatchError::ShardParse {
                    key: key.clone(),
                    source,
                })?;

            if !shard.text.is_empty() {
                if !full_text.is_empty() {
                    full_text.push('\n');
                }
                full_text.push_str(&shard.text);
            }
            page_count += shard.pages.len();
        }

        info!(
            filename,
            shards = shard_keys.len(),
            pages = page_count,
            chars = full_text.len(),
            "Batch extraction complete"
        );

        let cleanup = self.cleanup(&input_key, &listed).await;
        if cleanup.degraded() {
            warn!(
                filename,
                deleted = cleanup.deleted,
                failed = cleanup.failed,
                "Staged object cleanup was incomplete"
            );
        }

        Ok(ExtractionResult {
            full_text,
            page_count,
            method: ProcessingMethod::BatchOcr,
        })
    }

    /// Deletes the staged input object and everything the job wrote under
    /// the output prefix. Failures are counted and logged, never returned.
    async fn cleanup(&self, input_key: &str, output_keys: &[String]) -> CleanupOutcome {
        let mut outcome = CleanupOutcome::default();

        match self.stage.delete_input(input_key).await {
            Ok(()) => outcome.deleted += 1,
            Err(e) => {
                outcome.failed += 1;
                warn!(key = input_key, error = %e, "Failed to delete staged input");
            }
        }

        for key in output_keys {
            match self.stage.delete_output(key).await {
                Ok(()) => outcome.deleted += 1,
                Err(e) => {
                    outcome.failed += 1;
                    warn!(key = %key, error = %e, "Failed to delete output shard");
                }
            }
        }

        outcome
    }
}
