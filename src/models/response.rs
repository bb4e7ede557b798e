use serde::Serialize;

use crate::services::{
    DocumentClassification, FileSetDecision, ProcessingMethod, ValidationVerdict,
};

/// Response envelope for the intake endpoint. Successes and failures are
/// reported side by side so a caller can retry individual files.
#[derive(Debug, Serialize)]
pub struct IntakeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub files: Vec<FileReportBody>,
    pub failures: Vec<FileFailureBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_decision: Option<FileSetDecision>,
    pub processing_time_ms: u64,
}

/// A file that survived extraction and validation.
#[derive(Debug, Serialize)]
pub struct FileReportBody {
    pub filename: String,
    pub pages: usize,
    pub processing_method: ProcessingMethod,
    pub classification: DocumentClassification,
    pub validation: ValidationVerdict,
    pub text: String,
}

/// A file that was refused, with the specific code and message.
#[derive(Debug, Clone, Serialize)]
pub struct FileFailureBody {
    pub filename: String,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service: String,
}
