//! Secondary business-content classifier.
//!
//! Consulted only in the validator's low-confidence band. A transport
//! failure here must never block an intake request, so callers fail open.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("classifier returned malformed verdict: {message}")]
    Malformed { message: String },
}

/// Binary "is this a business document?" oracle.
#[async_trait]
pub trait SecondaryClassifier: Send + Sync {
    async fn is_business_document(&self, excerpt: &str) -> Result<bool, ClassifierError>;
}

/// HTTP implementation of [`SecondaryClassifier`].
pub struct RemoteClassifier {
    http: reqwest::Client,
    endpoint: String,
}

#[derive(Serialize)]
struct ClassifyRequestBody<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct ClassifyResponseBody {
    is_business: bool,
}

impl RemoteClassifier {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SecondaryClassifier for RemoteClassifier {
    async fn is_business_document(&self, excerpt: &str) -> Result<bool, ClassifierError> {
        debug!(chars = excerpt.len(), "Requesting secondary classification");

        let response = self
            .http
            .post(format!("{}/v1/classify", self.endpoint))
            .json(&ClassifyRequestBody { text: excerpt })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClassifierError::Malformed {
                message: format!("classifier returned status {}", response.status()),
            });
        }

        let verdict: ClassifyResponseBody =
            response.json().await.map_err(|e| ClassifierError::Malformed {
                message: e.to_string(),
            })?;

        Ok(verdict.is_business)
    }
}

/// Stand-in used when no classifier endpoint is configured: everything in
/// the low-confidence band passes, matching the fail-open contract.
pub struct PermissiveClassifier;

#[async_trait]
impl SecondaryClassifier for PermissiveClassifier {
    async fn is_business_document(&self, _excerpt: &str) -> Result<bool, ClassifierError> {
        Ok(true)
    }
}
