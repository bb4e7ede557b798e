//! Unit tests for individual components

use std::sync::Arc;

use async_trait::async_trait;

use diligence::config::Config;
use diligence::error::AppError;
use diligence::models::UploadedFile;
use diligence::services::{
    validate_set, ClassifierError, ContentValidator, DocumentClassifier, DocumentKind,
    ExtractionResult, FileSetCode, OcrError, PermissiveClassifier, ProcessingMethod,
    SecondaryClassifier, ValidationCode,
};
use diligence::services::validator::sanitize;

fn extraction(text: &str, pages: usize) -> ExtractionResult {
    ExtractionResult {
        full_text: text.to_string(),
        page_count: pages,
        method: ProcessingMethod::OnlineOcr,
    }
}

fn validator() -> ContentValidator {
    ContentValidator::new(Arc::new(PermissiveClassifier))
}

struct DenyingClassifier;

#[async_trait]
impl SecondaryClassifier for DenyingClassifier {
    async fn is_business_document(&self, _excerpt: &str) -> Result<bool, ClassifierError> {
        Ok(false)
    }
}

struct UnavailableClassifier;

#[async_trait]
impl SecondaryClassifier for UnavailableClassifier {
    async fn is_business_document(&self, _excerpt: &str) -> Result<bool, ClassifierError> {
        Err(ClassifierError::Malformed {
            message: "classifier returned status 503".to_string(),
        })
    }
}

// A business document that should sail through every layer.
const VALID_BUSINESS_TEXT: &str = "Our revenue grew steadily this quarter and recurring revenue \
    now covers operating costs. The team shipped a new product line while the team expanded \
    hiring across two regions. Early adopters praised the product quality and the company plans \
    a wider rollout next year.";

#[tokio::test]
async fn test_short_text_rejected() {
    let outcome = validator().validate(&extraction("hello", 1)).await;
    assert!(!outcome.verdict.is_valid);
    assert_eq!(outcome.verdict.code, ValidationCode::NoTextExtracted);
}

#[tokio::test]
async fn test_zero_pages_rejected_before_scoring() {
    let outcome = validator().validate(&extraction(VALID_BUSINESS_TEXT, 0)).await;
    assert!(!outcome.verdict.is_valid);
    assert_eq!(outcome.verdict.code, ValidationCode::NoPagesDetected);
}

#[tokio::test]
async fn test_resume_heavy_text_rejected_as_personal() {
    let text = "resume resume resume cv cv cv work experience work experience work experience \
                education: engineering education: science education: arts and some more filler \
                words so the document is long enough to score at all";
    let outcome = validator().validate(&extraction(text, 2)).await;
    assert!(!outcome.verdict.is_valid);
    assert_eq!(outcome.verdict.code, ValidationCode::PersonalDocument);
}

#[tokio::test]
async fn test_business_document_passes() {
    let outcome = validator().validate(&extraction(VALID_BUSINESS_TEXT, 12)).await;
    assert!(outcome.verdict.is_valid, "unexpected: {:?}", outcome.verdict);
    assert_eq!(outcome.verdict.code, ValidationCode::Valid);
    assert!(outcome.scores.business_score >= 2.0);
    assert_eq!(outcome.scores.personal_score, 0.0);
}

#[tokio::test]
async fn test_weak_business_signal_rejected() {
    let text = "This document describes a product for nobody in particular and says very \
                little else of real substance beyond filler sentences that mention no \
                commercial vocabulary whatsoever, on purpose, for this check.";
    let outcome = validator().validate(&extraction(text, 1)).await;
    assert!(!outcome.verdict.is_valid);
    assert_eq!(
        outcome.verdict.code,
        ValidationCode::InsufficientBusinessContent
    );
}

#[tokio::test]
async fn test_validation_is_idempotent() {
    let v = validator();
    let ext = extraction(VALID_BUSINESS_TEXT, 12);
    let first = v.validate(&ext).await;
    let second = v.validate(&ext).await;
    assert_eq!(first.verdict.is_valid, second.verdict.is_valid);
    assert_eq!(first.verdict.code, second.verdict.code);
    assert_eq!(first.scores.business_score, second.scores.business_score);
    assert_eq!(first.sanitized_text, second.sanitized_text);
}

#[tokio::test]
async fn test_too_few_words_rejected() {
    let text = "Revenue and revenue with team and team on product and product here.";
    let outcome = validator().validate(&extraction(text, 1)).await;
    assert!(!outcome.verdict.is_valid);
    assert_eq!(outcome.verdict.code, ValidationCode::InsufficientContent);
}

#[tokio::test]
async fn test_form_like_document_rejected() {
    // A scanned form: plenty of words, all in short fragments.
    let mut lines: Vec<String> = (0..20)
        .map(|i| format!("field {}: value", i))
        .collect();
    lines.push("revenue: 100".to_string());
    lines.push("team: four".to_string());
    lines.push("product: app".to_string());
    let text = lines.join("\n");

    let outcome = validator().validate(&extraction(&text, 1)).await;
    assert!(!outcome.verdict.is_valid);
    assert_eq!(
        outcome.verdict.code,
        ValidationCode::LikelyStructuredDocument
    );
}

#[tokio::test]
async fn test_business_context_suppresses_medical_category() {
    // A health-tech deck legitimately discusses diagnosis and physicians;
    // the startup/funding context must keep it from being read as a
    // personal medical record.
    let text = "Our startup raised seed funding from a healthcare investor. The founder \
                built a product that helps a physician confirm a diagnosis faster, and a \
                second diagnosis workflow ships next quarter. Revenue comes from clinics, \
                the team keeps growing, and prescription refill reminders drive traction \
                with early customers.";
    let outcome = validator().validate(&extraction(text, 9)).await;
    assert!(outcome.verdict.is_valid, "unexpected: {:?}", outcome.verdict);
}

#[tokio::test]
async fn test_mixed_personal_and_business_rejected() {
    let text = "Notes from our vacation and another vacation with a selfie and one more \
                selfie for the album, loosely attached to a product update from the team \
                with enough additional words sprinkled in to pass the basic length checks \
                without adding further commercial substance.";
    let outcome = validator().validate(&extraction(text, 3)).await;
    assert!(!outcome.verdict.is_valid);
    assert_eq!(outcome.verdict.code, ValidationCode::MixedPersonalBusiness);
}

#[tokio::test]
async fn test_secondary_classifier_rejects_low_confidence_document() {
    // business_score in [2, 3): passes layer 3 but gets a second opinion.
    let text = "The product update went out to the team mailing list this week with notes \
                about maintenance windows, office moves, seating arrangements and a long \
                discussion of catering options for the upcoming offsite gathering.";
    let v = ContentValidator::new(Arc::new(DenyingClassifier));
    let outcome = v.validate(&extraction(text, 2)).await;
    assert!(!outcome.verdict.is_valid);
    assert_eq!(
        outcome.verdict.code,
        ValidationCode::SecondaryValidationFailed
    );
}

#[tokio::test]
async fn test_secondary_classifier_failure_fails_open() {
    let text = "The product update went out to the team mailing list this week with notes \
                about maintenance windows, office moves, seating arrangements and a long \
                discussion of catering options for the upcoming offsite gathering.";
    let v = ContentValidator::new(Arc::new(UnavailableClassifier));
    let outcome = v.validate(&extraction(text, 2)).await;
    assert!(outcome.verdict.is_valid, "classifier outage must not block intake");
}

#[test]
fn test_sanitize_strips_control_characters() {
    let sanitized = sanitize("bad\u{0}byte\u{7}s   and\t\tspaced\nsecond   line");
    assert_eq!(sanitized, "badbytes and spaced\nsecond line");
}

#[test]
fn test_classifier_priority_order() {
    let classifier = DocumentClassifier::new();

    let resume = classifier.classify(
        "Work experience at two firms. Education from a state university. Skills in sales.",
        "john.pdf",
    );
    assert_eq!(resume.kind, DocumentKind::Resume);
    assert!(!resume.is_primary);

    let pitch = classifier.classify(
        "Our business model is subscriptions and we are raising funding this spring.",
        "deck.pdf",
    );
    assert_eq!(pitch.kind, DocumentKind::PitchDeck);
    assert!(pitch.is_primary);

    // Resume vocabulary outranks pitch vocabulary.
    let both = classifier.classify(
        "Work experience building decks. Education in finance. Business model and funding slides.",
        "mixed.pdf",
    );
    assert_eq!(both.kind, DocumentKind::Resume);

    let model = classifier.classify(
        "The income statement, balance sheet and cash flow tabs share one assumptions sheet.",
        "model.xlsx.pdf",
    );
    assert_eq!(model.kind, DocumentKind::FinancialModel);
    assert!(model.is_primary);

    let unknown = classifier.classify("nothing relevant in here at all", "scan.pdf");
    assert_eq!(unknown.kind, DocumentKind::Unknown);
    assert!(!unknown.is_primary);
}

#[test]
fn test_classifier_uses_filename_evidence() {
    let classifier = DocumentClassifier::new();
    let classification = classifier.classify("plain text with no vocabulary", "jane-resume-cv.pdf");
    assert_eq!(classification.kind, DocumentKind::Resume);
}

#[test]
fn test_classifier_honors_resume_tag() {
    let classifier = DocumentClassifier::new();
    let classification =
        classifier.classify_tagged("no resume vocabulary present", "file.pdf", true);
    assert_eq!(classification.kind, DocumentKind::Resume);
    assert!(!classification.is_primary);
}

#[test]
fn test_file_set_decisions() {
    let classifier = DocumentClassifier::new();
    let resume = classifier.classify_tagged("", "r.pdf", true);
    let pitch = classifier.classify(
        "business model and funding and traction for investors",
        "deck.pdf",
    );

    let empty = validate_set(&[]);
    assert!(!empty.is_valid);
    assert_eq!(empty.code, FileSetCode::NoFiles);

    let with_primary = validate_set(&[resume, pitch]);
    assert!(with_primary.is_valid);
    assert_eq!(with_primary.code, FileSetCode::Accepted);

    let supplementary_only = validate_set(&[resume]);
    assert!(!supplementary_only.is_valid);
    assert_eq!(supplementary_only.code, FileSetCode::SupplementaryOnly);

    let unknown = DocumentClassifier::new().classify("nothing here", "x.pdf");
    let unknown_only = validate_set(&[unknown]);
    assert!(!unknown_only.is_valid);
    assert_eq!(unknown_only.code, FileSetCode::UnknownDocuments);
}

#[test]
fn test_file_admission() {
    let max = 50 * 1024 * 1024;

    let ok = UploadedFile::new("deck.pdf".to_string(), vec![1, 2, 3]);
    assert!(ok.admit(max).is_ok());
    assert_eq!(ok.mime_type(), "application/pdf");

    let empty = UploadedFile::new("deck.pdf".to_string(), vec![]);
    assert_eq!(empty.admit(max).unwrap_err().code, "EMPTY_FILE");

    let huge = UploadedFile::new("deck.pdf".to_string(), vec![0; 16]);
    assert_eq!(huge.admit(8).unwrap_err().code, "FILE_TOO_LARGE");

    let exe = UploadedFile::new("tool.exe".to_string(), vec![1]);
    assert_eq!(exe.admit(max).unwrap_err().code, "INVALID_FILE_TYPE");

    let unnamed = UploadedFile::new(String::new(), vec![1]);
    assert_eq!(unnamed.admit(max).unwrap_err().code, "FILE_NOT_PROVIDED");
}

#[test]
fn test_page_limit_vocabulary() {
    let from_code = OcrError::Provider {
        message: "PAGE_LIMIT_EXCEEDED".to_string(),
    };
    assert!(from_code.is_page_limit());

    let from_text = OcrError::Provider {
        message: "Document pages exceed the configured maximum".to_string(),
    };
    assert!(from_text.is_page_limit());

    let imageless = OcrError::Provider {
        message: "request used non-imageless mode for a large document".to_string(),
    };
    assert!(imageless.is_page_limit());

    let unrelated = OcrError::Provider {
        message: "document is encrypted".to_string(),
    };
    assert!(!unrelated.is_page_limit());

    let job = OcrError::JobFailed {
        job_id: "op-1".to_string(),
        message: "exceeded quota".to_string(),
    };
    assert!(!job.is_page_limit());
}

#[test]
fn test_config_defaults() {
    let config = Config::from_env().unwrap();
    assert_eq!(config.max_file_size_mb, 50);
    assert_eq!(config.batch_timeout_seconds, 900);
    assert_eq!(config.ocr_enabled, true);
    assert!(!config.input_bucket.is_empty());
    assert!(!config.output_bucket.is_empty());
}

#[test]
fn test_error_codes_and_status() {
    use axum::http::StatusCode;

    assert_eq!(AppError::InvalidApiKey.error_code(), "INVALID_API_KEY");
    assert_eq!(AppError::InvalidApiKey.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::RateLimitExceeded.error_code(), "RATE_LIMIT_EXCEEDED");
    assert_eq!(
        AppError::RateLimitExceeded.status_code(),
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(AppError::MissingFiles.error_code(), "FILE_NOT_PROVIDED");
    assert_eq!(AppError::MissingFiles.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::bad_request("x").status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::config("x").error_code(), "CONFIG_ERROR");
}
