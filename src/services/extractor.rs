//! Extraction coordination: online first, batch on page-limit refusal.
//!
//! The provider enforces page ceilings server-side, so the coordinator
//! cannot predict which path a document needs without pre-parsing it.
//! It always attempts the synchronous call and reacts to the specific
//! page-limit failure signal; any other failure is terminal for the file.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::services::batch::{BatchError, BatchStager};
use crate::services::object_stage::ObjectStage;
use crate::services::ocr_client::{OcrClient, OcrError, MAX_IMAGELESS_PAGES, MAX_ONLINE_PAGES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMethod {
    OnlineOcr,
    OnlineImageless,
    BatchOcr,
}

impl ProcessingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingMethod::OnlineOcr => "online_ocr",
            ProcessingMethod::OnlineImageless => "online_imageless",
            ProcessingMethod::BatchOcr => "batch_ocr",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub full_text: String,
    pub page_count: usize,
    pub method: ProcessingMethod,
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("online extraction failed: {0}")]
    Online(#[source] OcrError),

    #[error(transparent)]
    Batch(#[from] BatchError),
}

impl ExtractionError {
    pub fn code(&self) -> &'static str {
        match self {
            ExtractionError::Online(_) => "EXTRACTION_FAILED",
            ExtractionError::Batch(BatchError::Timeout(_)) => "BATCH_TIMEOUT",
            ExtractionError::Batch(BatchError::NoOutput { .. }) => "BATCH_NO_OUTPUT",
            ExtractionError::Batch(BatchError::ShardParse { .. }) => "BATCH_OUTPUT_INVALID",
            ExtractionError::Batch(_) => "BATCH_EXTRACTION_FAILED",
        }
    }
}

pub struct ExtractionCoordinator<'a> {
    ocr: &'a dyn OcrClient,
    stage: &'a ObjectStage,
    batch_timeout: Duration,
}

impl<'a> ExtractionCoordinator<'a> {
    pub fn new(ocr: &'a dyn OcrClient, stage: &'a ObjectStage, batch_timeout: Duration) -> Self {
        Self {
            ocr,
            stage,
            batch_timeout,
        }
    }

    pub async fn extract(
        &self,
        content: &[u8],
        filename: &str,
        mime_type: &str,
        ocr_enabled: bool,
    ) -> Result<ExtractionResult, ExtractionError> {
        let online_limit = if ocr_enabled {
            MAX_ONLINE_PAGES
        } else {
            MAX_IMAGELESS_PAGES
        };
        info!(
            filename,
            ocr_enabled, online_limit, "Attempting online extraction"
        );

        match self.ocr.process(content, mime_type, ocr_enabled).await {
            Ok(document) => {
                let method = if ocr_enabled {
                    ProcessingMethod::OnlineOcr
                } else {
                    ProcessingMethod::OnlineImageless
                };
                info!(
                    filename,
                    pages = document.pages.len(),
                    chars = document.text.len(),
                    method = method.as_str(),
                    "Online extraction successful"
                );
                Ok(ExtractionResult {
                    full_text: document.text,
                    page_count: document.pages.len(),
                    method,
                })
            }
            Err(e) if e.is_page_limit() => {
                warn!(
                    filename,
                    error = %e,
                    "Document exceeds online page limit, falling back to batch"
                );
                let stager = BatchStager::new(self.ocr, self.stage, self.batch_timeout);
                Ok(stager.batch_extract(content, filename).await?)
            }
            Err(e) => Err(ExtractionError::Online(e)),
        }
    }
}
