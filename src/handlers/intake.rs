use std::time::Instant;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Json,
};
use tracing::{debug, error, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{FileReportBody, IntakeResponse, UploadedFile};
use crate::services::IntakeOutcome;
use crate::AppState;

/// Document intake endpoint. Accepts one or more files in the `documents`
/// multipart field, runs the full extraction/validation pipeline, and
/// reports per-file results alongside one decision for the whole set.
pub async fn intake_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<IntakeResponse>)> {
    let start = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string()[..8].to_string();

    info!(request_id = %request_id, "Starting document intake request");

    // Bound concurrent intake work; extraction can hold a worker for the
    // full batch timeout.
    let _permit = state.limiter.try_acquire().map_err(|_| {
        warn!(request_id = %request_id, "Rate limit exceeded");
        AppError::RateLimitExceeded
    })?;

    debug!(request_id = %request_id, "Request permit acquired");

    let files = collect_files(&mut multipart).await?;
    if files.is_empty() {
        warn!(request_id = %request_id, "No files found in 'documents' field");
        return Err(AppError::MissingFiles);
    }

    info!(
        request_id = %request_id,
        file_count = files.len(),
        "Files received, starting pipeline"
    );

    let outcome = state.pipeline.process(files).await;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    let (status, response) = build_response(outcome, elapsed_ms);

    info!(
        request_id = %request_id,
        status = %status,
        total_time_ms = elapsed_ms,
        "Intake request completed"
    );

    Ok((status, Json(response)))
}

async fn collect_files(multipart: &mut Multipart) -> AppResult<Vec<UploadedFile>> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!(error = %e, "Failed to read multipart field");
        AppError::bad_request(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or("");
        if field_name != "documents" {
            continue;
        }

        let filename = field.file_name().unwrap_or("").to_string();
        let content_type = field.content_type().map(|ct| ct.to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(format!("Failed to read file data: {}", e)))?;

        let mut file = UploadedFile::new(filename, data.to_vec());
        if let Some(mime) = content_type {
            file = file.with_declared_mime(mime);
        }

        debug!(
            filename = %file.filename,
            size = file.size,
            extension = %file.extension,
            "File collected from multipart form"
        );

        files.push(file);
    }

    Ok(files)
}

fn build_response(outcome: IntakeOutcome, elapsed_ms: u64) -> (StatusCode, IntakeResponse) {
    let files: Vec<FileReportBody> = outcome
        .accepted
        .into_iter()
        .map(|report| FileReportBody {
            filename: report.filename,
            pages: report.page_count,
            processing_method: report.method,
            classification: report.classification,
            validation: report.verdict,
            text: report.text,
        })
        .collect();

    if files.is_empty() {
        // Nothing survived extraction and validation; the per-file details
        // tell the caller which files to fix and retry.
        let response = IntakeResponse {
            success: false,
            code: Some("NO_VALID_FILES".to_string()),
            message: Some("No valid files could be processed".to_string()),
            files,
            failures: outcome.failures,
            set_decision: None,
            processing_time_ms: elapsed_ms,
        };
        return (StatusCode::BAD_REQUEST, response);
    }

    if !outcome.set_decision.is_valid {
        let response = IntakeResponse {
            success: false,
            code: Some(outcome.set_decision.code.as_str().to_string()),
            message: Some(outcome.set_decision.message.clone()),
            files,
            failures: outcome.failures,
            set_decision: Some(outcome.set_decision),
            processing_time_ms: elapsed_ms,
        };
        return (StatusCode::BAD_REQUEST, response);
    }

    let response = IntakeResponse {
        success: true,
        code: None,
        message: None,
        files,
        failures: outcome.failures,
        set_decision: Some(outcome.set_decision),
        processing_time_ms: elapsed_ms,
    };
    (StatusCode::OK, response)
}
