//! Client for the external OCR/text-extraction provider.
//!
//! The provider enforces its page ceilings server-side, so page-limit
//! refusals are only observable as errors on the synchronous call. The
//! coordinator inspects [`OcrError::is_page_limit`] to decide whether to
//! fall back to the asynchronous batch path.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Page ceiling for synchronous processing with OCR enabled.
pub const MAX_ONLINE_PAGES: usize = 15;
/// Page ceiling for synchronous imageless (native-text) processing.
pub const MAX_IMAGELESS_PAGES: usize = 30;

const OPERATION_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR provider rejected the document: {message}")]
    Provider { message: String },

    #[error("OCR request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("batch job {job_id} failed: {message}")]
    JobFailed { job_id: String, message: String },

    #[error("malformed OCR response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl OcrError {
    /// Whether the provider refused the document because it exceeds the
    /// online page ceiling. The provider does not use a stable error code
    /// for this, so the message is matched against its known vocabulary.
    pub fn is_page_limit(&self) -> bool {
        match self {
            OcrError::Provider { message } => {
                let msg = message.to_lowercase();
                msg.contains("page limit exceeded")
                    || msg.contains("page_limit_exceeded")
                    || msg.contains("exceed")
                    || msg.contains("non-imageless")
            }
            _ => false,
        }
    }
}

/// Per-page structure returned by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrPage {
    #[serde(default)]
    pub page_number: u32,
}

/// A processed document: full text plus per-page structure. Batch output
/// shards deserialize into the same shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrDocument {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub pages: Vec<OcrPage>,
}

/// Handle for a submitted asynchronous extraction job. Dropping the wait
/// future abandons the job client-side; the caller wraps it in a timeout.
#[async_trait]
pub trait BatchJob: Send {
    async fn wait(&mut self) -> Result<(), OcrError>;
}

/// The OCR provider surface the pipeline depends on. Injected as a handle
/// so tests can substitute a scripted provider.
#[async_trait]
pub trait OcrClient: Send + Sync {
    /// Synchronous extraction. Fails with a page-limit error for documents
    /// over the online ceiling.
    async fn process(
        &self,
        content: &[u8],
        mime_type: &str,
        enable_ocr: bool,
    ) -> Result<OcrDocument, OcrError>;

    /// Submit an asynchronous extraction job reading `input_uri` and
    /// writing result shards under `output_uri`.
    async fn submit_batch(
        &self,
        input_uri: &str,
        output_uri: &str,
    ) -> Result<Box<dyn BatchJob>, OcrError>;
}

/// HTTP implementation of [`OcrClient`].
pub struct RemoteOcrClient {
    http: reqwest::Client,
    endpoint: String,
}

#[derive(Serialize)]
struct ProcessRequestBody<'a> {
    content: String,
    mime_type: &'a str,
    enable_ocr: bool,
}

#[derive(Serialize)]
struct BatchRequestBody<'a> {
    input_uri: &'a str,
    output_uri: &'a str,
}

#[derive(Deserialize)]
struct BatchSubmitBody {
    operation: String,
}

#[derive(Deserialize)]
struct OperationBody {
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    message: String,
}

impl RemoteOcrClient {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    async fn provider_error(response: reqwest::Response) -> OcrError {
        let status = response.status();
        let message = match response.json::<ProviderErrorBody>().await {
            Ok(body) if !body.message.is_empty() => body.message,
            _ => format!("provider returned status {}", status),
        };
        OcrError::Provider { message }
    }
}

#[async_trait]
impl OcrClient for RemoteOcrClient {
    async fn process(
        &self,
        content: &[u8],
        mime_type: &str,
        enable_ocr: bool,
    ) -> Result<OcrDocument, OcrError> {
        debug!(
            size = content.len(),
            mime_type, enable_ocr, "Submitting document for online processing"
        );

        let body = ProcessRequestBody {
            content: base64::engine::general_purpose::STANDARD.encode(content),
            mime_type,
            enable_ocr,
        };

        let response = self
            .http
            .post(format!("{}/v1/documents:process", self.endpoint))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }

        let document: OcrDocument = response.json().await?;
        debug!(
            pages = document.pages.len(),
            chars = document.text.len(),
            "Online processing returned"
        );
        Ok(document)
    }

    async fn submit_batch(
        &self,
        input_uri: &str,
        output_uri: &str,
    ) -> Result<Box<dyn BatchJob>, OcrError> {
        info!(input_uri, output_uri, "Submitting batch extraction job");

        let body = BatchRequestBody {
            input_uri,
            output_uri,
        };

        let response = self
            .http
            .post(format!("{}/v1/documents:batchProcess", self.endpoint))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }

        let submitted: BatchSubmitBody = response.json().await?;
        info!(operation = %submitted.operation, "Batch job accepted");

        Ok(Box::new(RemoteBatchJob {
            http: self.http.clone(),
            endpoint: self.endpoint.clone(),
            operation: submitted.operation,
        }))
    }
}

struct RemoteBatchJob {
    http: reqwest::Client,
    endpoint: String,
    operation: String,
}

#[async_trait]
impl BatchJob for RemoteBatchJob {
    async fn wait(&mut self) -> Result<(), OcrError> {
        loop {
            let response = self
                .http
                .get(format!("{}/v1/operations/{}", self.endpoint, self.operation))
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(RemoteOcrClient::provider_error(response).await);
            }

            let operation: OperationBody = response.json().await?;
            if operation.done {
                return match operation.error {
                    None => Ok(()),
                    Some(message) => Err(OcrError::JobFailed {
                        job_id: self.operation.clone(),
                        message,
                    }),
                };
            }

            debug!(operation = %self.operation, "Batch job still running");
            tokio::time::sleep(OPERATION_POLL_INTERVAL).await;
        }
    }
}
