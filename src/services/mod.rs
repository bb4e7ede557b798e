pub mod batch;
pub mod classifier;
pub mod extractor;
pub mod keywords;
pub mod object_stage;
pub mod ocr_client;
pub mod pipeline;
pub mod secondary;
pub mod validator;

pub use batch::{BatchError, BatchStager, CleanupOutcome};
pub use classifier::{
    validate_set, DocumentClassification, DocumentClassifier, DocumentKind, FileSetCode,
    FileSetDecision,
};
pub use extractor::{ExtractionCoordinator, ExtractionError, ExtractionResult, ProcessingMethod};
pub use object_stage::ObjectStage;
pub use ocr_client::{BatchJob, OcrClient, OcrDocument, OcrError, OcrPage, RemoteOcrClient};
pub use pipeline::{FileFailure, FileReport, IntakeOutcome, IntakePipeline};
pub use secondary::{ClassifierError, PermissiveClassifier, RemoteClassifier, SecondaryClassifier};
pub use validator::{
    ContentValidator, ValidationCode, ValidationOutcome, ValidationScores, ValidationVerdict,
    MIN_EXTRACTED_TEXT,
};
