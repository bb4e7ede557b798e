use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::AppError;

/// Bearer-token authentication against the configured API key set. Health
/// and readiness endpoints stay open for probes.
pub async fn auth_middleware(
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path();
    let method = request.method();

    if path == "/health" || path == "/ready" {
        return Ok(next.run(request).await);
    }

    debug!("Authenticating request: {} {}", method, path);

    let token = headers
        .get("authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .unwrap_or("");

    if token.is_empty() {
        warn!("Missing or malformed Authorization header for {} {}", method, path);
        return Err(AppError::InvalidApiKey);
    }

    if !Config::validate_api_key(token) {
        warn!(
            "Invalid API key attempted for {} {}: {}",
            method,
            path,
            if token.len() > 8 { &token[..8] } else { token }
        );
        return Err(AppError::InvalidApiKey);
    }

    debug!("Valid API key authenticated for {} {}", method, path);
    Ok(next.run(request).await)
}
