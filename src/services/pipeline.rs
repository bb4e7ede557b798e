//! The intake pipeline: admission, extraction, validation, classification
//! and the file-set decision for one request.
//!
//! Files are processed strictly sequentially. A single file's failure is
//! recorded and processing continues; only the set decision and the
//! zero-survivors case fail the request as a whole.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::models::{FileFailureBody, UploadedFile};
use crate::services::classifier::{validate_set, DocumentClassification, DocumentClassifier};
use crate::services::extractor::{ExtractionCoordinator, ProcessingMethod};
use crate::services::object_stage::ObjectStage;
use crate::services::ocr_client::OcrClient;
use crate::services::validator::{ContentValidator, ValidationVerdict};
use crate::services::FileSetDecision;

/// A file that survived extraction and validation, carrying the sanitized
/// text downstream analysis consumes.
#[derive(Debug)]
pub struct FileReport {
    pub filename: String,
    pub page_count: usize,
    pub method: ProcessingMethod,
    pub classification: DocumentClassification,
    pub verdict: ValidationVerdict,
    pub text: String,
}

pub type FileFailure = FileFailureBody;

#[derive(Debug)]
pub struct IntakeOutcome {
    pub accepted: Vec<FileReport>,
    pub failures: Vec<FileFailure>,
    pub set_decision: FileSetDecision,
}

pub struct IntakePipeline {
    ocr: Arc<dyn OcrClient>,
    stage: Arc<ObjectStage>,
    validator: ContentValidator,
    classifier: DocumentClassifier,
    ocr_enabled: bool,
    max_file_size_bytes: usize,
    batch_timeout: std::time::Duration,
}

impl IntakePipeline {
    pub fn new(
        ocr: Arc<dyn OcrClient>,
        stage: Arc<ObjectStage>,
        validator: ContentValidator,
        config: &Config,
    ) -> Self {
        Self {
            ocr,
            stage,
            validator,
            classifier: DocumentClassifier::new(),
            ocr_enabled: config.ocr_enabled,
            max_file_size_bytes: config.max_file_size_bytes(),
            batch_timeout: config.batch_timeout(),
        }
    }

    pub async fn process(&self, files: Vec<UploadedFile>) -> IntakeOutcome {
        let coordinator =
            ExtractionCoordinator::new(self.ocr.as_ref(), &self.stage, self.batch_timeout);

        let mut accepted: Vec<FileReport> = Vec::new();
        let mut failures: Vec<FileFailure> = Vec::new();

        for file in files {
            info!(filename = %file.filename, size = file.size, "Processing file");

            if let Err(refusal) = file.admit(self.max_file_size_bytes) {
                warn!(filename = %file.filename, code = refusal.code, "File refused at admission");
                failures.push(FileFailure {
                    filename: file.filename,
                    code: refusal.code.to_string(),
                    message: refusal.message,
                });
                continue;
            }

            let extraction = match coordinator
                .extract(&file.content, &file.filename, file.mime_type(), self.ocr_enabled)
                .await
            {
                Ok(extraction) => extraction,
                Err(e) => {
                    warn!(filename = %file.filename, error = %e, "Extraction failed");
                    failures.push(FileFailure {
                        filename: file.filename,
                        code: e.code().to_string(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            let outcome = self.validator.validate(&extraction).await;
            if !outcome.verdict.is_valid {
                failures.push(FileFailure {
                    filename: file.filename,
                    code: outcome.verdict.code.as_str().to_string(),
                    message: outcome.verdict.message,
                });
                continue;
            }

            let classification = self.classifier.classify_tagged(
                &outcome.sanitized_text,
                &file.filename,
                outcome.scores.resume_signal,
            );

            info!(
                filename = %file.filename,
                pages = extraction.page_count,
                method = extraction.method.as_str(),
                kind = classification.kind.as_str(),
                "File accepted"
            );

            accepted.push(FileReport {
                filename: file.filename,
                page_count: extraction.page_count,
                method: extraction.method,
                classification,
                verdict: outcome.verdict,
                text: outcome.sanitized_text,
            });
        }

        let classifications: Vec<DocumentClassification> =
            accepted.iter().map(|r| r.classification).collect();
        let set_decision = validate_set(&classifications);

        info!(
            accepted = accepted.len(),
            failed = failures.len(),
            set_code = set_decision.code.as_str(),
            "Intake complete"
        );

        IntakeOutcome {
            accepted,
            failures,
            set_decision,
        }
    }
}
