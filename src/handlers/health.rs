use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use std::time::SystemTime;
use tracing::info;

use crate::error::AppResult;
use crate::AppState;

/// Health check endpoint
pub async fn health_handler(State(state): State<AppState>) -> AppResult<Json<Value>> {
    info!("Health check requested");

    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs();

    let response = json!({
        "status": "healthy",
        "timestamp": timestamp,
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "ocr_endpoint": state.config.ocr_endpoint,
            "ocr_enabled": state.config.ocr_enabled,
            "secondary_classifier": state.config.classifier_endpoint.is_some(),
        },
        "rate_limiting": {
            "available_permits": state.limiter.available_permits(),
            "max_concurrent_requests": state.config.max_concurrent_requests,
        }
    });

    Ok(Json(response))
}

/// Readiness check endpoint (for Kubernetes deployments)
pub async fn ready_handler(State(state): State<AppState>) -> Result<StatusCode, StatusCode> {
    if state.limiter.available_permits() > 0 {
        Ok(StatusCode::OK)
    } else {
        info!("Readiness check failed - no request capacity available");
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}
