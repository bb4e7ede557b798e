//! Integration tests for the document intake pipeline, driving the
//! extraction coordinator and batch stager against an in-memory object
//! stage and scripted OCR providers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use opendal::{services, Operator};

use diligence::config::Config;
use diligence::models::UploadedFile;
use diligence::services::{
    BatchError, BatchJob, BatchStager, ContentValidator, DocumentKind, ExtractionCoordinator,
    ExtractionError, FileSetCode, IntakePipeline, ObjectStage, OcrClient, OcrDocument, OcrError,
    OcrPage, PermissiveClassifier, ProcessingMethod,
};

fn test_config() -> Config {
    Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 8080,
        max_file_size_mb: 50,
        max_concurrent_requests: 4,
        request_timeout_seconds: 30,
        ocr_endpoint: "http://127.0.0.1:8700".to_string(),
        ocr_enabled: true,
        input_bucket: "intake-input".to_string(),
        output_bucket: "intake-output".to_string(),
        batch_timeout_seconds: 5,
        classifier_endpoint: None,
    }
}

fn memory_stage() -> (ObjectStage, Operator, Operator) {
    let input = Operator::new(services::Memory::default()).unwrap().finish();
    let output = Operator::new(services::Memory::default()).unwrap().finish();
    let stage = ObjectStage::new(
        input.clone(),
        output.clone(),
        "intake-input",
        "intake-output",
    );
    (stage, input, output)
}

async fn remaining_files(op: &Operator) -> Vec<String> {
    let entries: Vec<opendal::Entry> = op
        .lister_with("/")
        .recursive(true)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    entries
        .into_iter()
        .map(|e| e.path().to_string())
        .filter(|p| !p.ends_with('/'))
        .collect()
}

fn shard(text: &str, pages: usize) -> OcrDocument {
    OcrDocument {
        text: text.to_string(),
        pages: (1..=pages)
            .map(|i| OcrPage {
                page_number: i as u32,
            })
            .collect(),
    }
}

/// Key prefix under the bucket for a `gs://bucket/prefix/` URI.
fn strip_bucket(uri: &str) -> String {
    uri.splitn(4, '/').nth(3).unwrap().to_string()
}

struct CompletedJob;

#[async_trait]
impl BatchJob for CompletedJob {
    async fn wait(&mut self) -> Result<(), OcrError> {
        Ok(())
    }
}

/// Provider that refuses online processing with a page-limit error and
/// writes result shards when the batch job is submitted. Shards are
/// written in an order that differs from their page order.
struct LargeDocumentOcr {
    output: Operator,
}

#[async_trait]
impl OcrClient for LargeDocumentOcr {
    async fn process(
        &self,
        _content: &[u8],
        _mime_type: &str,
        _enable_ocr: bool,
    ) -> Result<OcrDocument, OcrError> {
        Err(OcrError::Provider {
            message: "PAGE_LIMIT_EXCEEDED: document has 40 pages and exceeds the online limit"
                .to_string(),
        })
    }

    async fn submit_batch(
        &self,
        _input_uri: &str,
        output_uri: &str,
    ) -> Result<Box<dyn BatchJob>, OcrError> {
        let prefix = strip_bucket(output_uri);
        let shards = [
            ("shard-0002.json", shard("bravo pages", 13)),
            ("shard-0001.json", shard("alpha pages", 14)),
            ("shard-0003.json", shard("charlie pages", 13)),
        ];
        for (name, doc) in shards {
            let key = format!("{}{}", prefix, name);
            self.output
                .write(&key, serde_json::to_vec(&doc).unwrap())
                .await
                .unwrap();
        }
        Ok(Box::new(CompletedJob))
    }
}

#[tokio::test]
async fn test_page_limited_document_falls_back_to_batch() {
    let (stage, input_op, output_op) = memory_stage();
    let ocr = LargeDocumentOcr {
        output: output_op.clone(),
    };
    let coordinator = ExtractionCoordinator::new(&ocr, &stage, Duration::from_secs(900));

    let result = coordinator
        .extract(b"%PDF-1.7 forty page deck", "big-deck.pdf", "application/pdf", true)
        .await
        .unwrap();

    assert_eq!(result.method, ProcessingMethod::BatchOcr);
    assert_eq!(result.page_count, 40);
    // Merge order follows shard names, not the order shards were written.
    assert_eq!(result.full_text, "alpha pages\nbravo pages\ncharlie pages");

    // Staged input and output objects are removed after a successful merge.
    assert!(remaining_files(&input_op).await.is_empty());
    assert!(remaining_files(&output_op).await.is_empty());
}

/// Provider whose batch jobs never finish.
struct StalledOcr;

struct NeverendingJob;

#[async_trait]
impl BatchJob for NeverendingJob {
    async fn wait(&mut self) -> Result<(), OcrError> {
        loop {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
    }
}

#[async_trait]
impl OcrClient for StalledOcr {
    async fn process(
        &self,
        _content: &[u8],
        _mime_type: &str,
        _enable_ocr: bool,
    ) -> Result<OcrDocument, OcrError> {
        Err(OcrError::Provider {
            message: "page limit exceeded".to_string(),
        })
    }

    async fn submit_batch(
        &self,
        _input_uri: &str,
        _output_uri: &str,
    ) -> Result<Box<dyn BatchJob>, OcrError> {
        Ok(Box::new(NeverendingJob))
    }
}

#[tokio::test]
async fn test_batch_wait_times_out() {
    let (stage, _input_op, _output_op) = memory_stage();
    let stager = BatchStager::new(&StalledOcr, &stage, Duration::from_millis(50));

    let err = stager
        .batch_extract(b"%PDF-1.7", "slow.pdf")
        .await
        .unwrap_err();
    assert!(matches!(err, BatchError::Timeout(_)));
}

/// Provider whose batch jobs complete without writing any output.
struct SilentBatchOcr;

#[async_trait]
impl OcrClient for SilentBatchOcr {
    async fn process(
        &self,
        _content: &[u8],
        _mime_type: &str,
        _enable_ocr: bool,
    ) -> Result<OcrDocument, OcrError> {
        Err(OcrError::Provider {
            message: "page limit exceeded".to_string(),
        })
    }

    async fn submit_batch(
        &self,
        _input_uri: &str,
        _output_uri: &str,
    ) -> Result<Box<dyn BatchJob>, OcrError> {
        Ok(Box::new(CompletedJob))
    }
}

#[tokio::test]
async fn test_batch_without_output_shards_fails() {
    let (stage, _input_op, _output_op) = memory_stage();
    let stager = BatchStager::new(&SilentBatchOcr, &stage, Duration::from_secs(1));

    let err = stager
        .batch_extract(b"%PDF-1.7", "empty.pdf")
        .await
        .unwrap_err();
    assert!(matches!(err, BatchError::NoOutput { .. }));
}

/// Provider that fails online processing for a reason other than the page
/// limit. The coordinator must not attempt the batch path.
struct EncryptedDocumentOcr;

#[async_trait]
impl OcrClient for EncryptedDocumentOcr {
    async fn process(
        &self,
        _content: &[u8],
        _mime_type: &str,
        _enable_ocr: bool,
    ) -> Result<OcrDocument, OcrError> {
        Err(OcrError::Provider {
            message: "document is encrypted and cannot be read".to_string(),
        })
    }

    async fn submit_batch(
        &self,
        _input_uri: &str,
        _output_uri: &str,
    ) -> Result<Box<dyn BatchJob>, OcrError> {
        panic!("batch fallback must not run for non-page-limit failures");
    }
}

#[tokio::test]
async fn test_non_page_limit_error_is_fatal() {
    let (stage, _input_op, _output_op) = memory_stage();
    let coordinator =
        ExtractionCoordinator::new(&EncryptedDocumentOcr, &stage, Duration::from_secs(1));

    let err = coordinator
        .extract(b"%PDF-1.7", "locked.pdf", "application/pdf", true)
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractionError::Online(_)));
    assert_eq!(err.code(), "EXTRACTION_FAILED");
}

const PITCH_TEXT: &str = "Our business model is subscription revenue and this funding round \
    accelerates traction. The team grew while the product matured, and customers renew at \
    high rates with churn trending down across the platform over the last quarter.";

const RESUME_TEXT: &str = "Skills in data engineering and education from a coastal university \
    shaped a career. Led a product team through several release cycles, mentored junior staff, \
    coordinated schedules and kept the group focused on shipping during busy periods.";

/// Online provider scripted per document content.
struct CannedOcr {
    responses: Vec<(Vec<u8>, OcrDocument)>,
}

#[async_trait]
impl OcrClient for CannedOcr {
    async fn process(
        &self,
        content: &[u8],
        _mime_type: &str,
        _enable_ocr: bool,
    ) -> Result<OcrDocument, OcrError> {
        self.responses
            .iter()
            .find(|(bytes, _)| bytes.as_slice() == content)
            .map(|(_, doc)| doc.clone())
            .ok_or_else(|| OcrError::Provider {
                message: "unexpected document".to_string(),
            })
    }

    async fn submit_batch(
        &self,
        _input_uri: &str,
        _output_uri: &str,
    ) -> Result<Box<dyn BatchJob>, OcrError> {
        panic!("online documents must not reach the batch path");
    }
}

fn pipeline_with(responses: Vec<(Vec<u8>, OcrDocument)>) -> IntakePipeline {
    let (stage, _input_op, _output_op) = memory_stage();
    let config = test_config();
    IntakePipeline::new(
        Arc::new(CannedOcr { responses }),
        Arc::new(stage),
        ContentValidator::new(Arc::new(PermissiveClassifier)),
        &config,
    )
}

#[tokio::test]
async fn test_pitch_deck_with_resume_is_accepted() {
    let pipeline = pipeline_with(vec![
        (b"deck bytes".to_vec(), shard(PITCH_TEXT, 5)),
        (b"profile bytes".to_vec(), shard(RESUME_TEXT, 2)),
    ]);

    let outcome = pipeline
        .process(vec![
            UploadedFile::new("deck.pdf".to_string(), b"deck bytes".to_vec()),
            UploadedFile::new("profile.pdf".to_string(), b"profile bytes".to_vec()),
        ])
        .await;

    assert_eq!(outcome.failures.len(), 0);
    assert_eq!(outcome.accepted.len(), 2);
    assert_eq!(outcome.accepted[0].classification.kind, DocumentKind::PitchDeck);
    assert_eq!(outcome.accepted[1].classification.kind, DocumentKind::Resume);
    assert!(outcome.set_decision.is_valid);
    assert_eq!(outcome.set_decision.code, FileSetCode::Accepted);
}

#[tokio::test]
async fn test_resume_alone_is_supplementary_only() {
    let pipeline = pipeline_with(vec![(b"profile bytes".to_vec(), shard(RESUME_TEXT, 2))]);

    let outcome = pipeline
        .process(vec![UploadedFile::new(
            "profile.pdf".to_string(),
            b"profile bytes".to_vec(),
        )])
        .await;

    assert_eq!(outcome.accepted.len(), 1);
    assert!(!outcome.set_decision.is_valid);
    assert_eq!(outcome.set_decision.code, FileSetCode::SupplementaryOnly);
}

#[tokio::test]
async fn test_failed_file_is_recorded_and_processing_continues() {
    let pipeline = pipeline_with(vec![(b"deck bytes".to_vec(), shard(PITCH_TEXT, 5))]);

    let outcome = pipeline
        .process(vec![
            UploadedFile::new("malware.exe".to_string(), b"MZ".to_vec()),
            UploadedFile::new("deck.pdf".to_string(), b"deck bytes".to_vec()),
        ])
        .await;

    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].code, "INVALID_FILE_TYPE");
    assert_eq!(outcome.accepted.len(), 1);
    assert!(outcome.set_decision.is_valid);
}
