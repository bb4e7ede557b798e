//! Durable staging for the batch extraction path.
//!
//! Two logical buckets: input staging (raw uploads for the provider to
//! read) and output staging (result shards the provider writes). Backed by
//! OpenDAL operators so tests can run against the in-memory service.

use futures::TryStreamExt;
use opendal::{services, Operator};
use tracing::debug;

use crate::config::Config;

pub struct ObjectStage {
    input: Operator,
    output: Operator,
    input_bucket: String,
    output_bucket: String,
}

impl ObjectStage {
    pub fn new(
        input: Operator,
        output: Operator,
        input_bucket: impl Into<String>,
        output_bucket: impl Into<String>,
    ) -> Self {
        Self {
            input,
            output,
            input_bucket: input_bucket.into(),
            output_bucket: output_bucket.into(),
        }
    }

    /// Production configuration: one GCS operator per bucket.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let input = Operator::new(services::Gcs::default().bucket(&config.input_bucket))?.finish();
        let output =
            Operator::new(services::Gcs::default().bucket(&config.output_bucket))?.finish();
        Ok(Self::new(
            input,
            output,
            config.input_bucket.clone(),
            config.output_bucket.clone(),
        ))
    }

    /// URI for a staged input object, as referenced in batch job requests.
    pub fn input_uri(&self, key: &str) -> String {
        format!("gs://{}/{}", self.input_bucket, key)
    }

    /// URI prefix the provider writes output shards under.
    pub fn output_uri(&self, prefix: &str) -> String {
        format!("gs://{}/{}/", self.output_bucket, prefix)
    }

    pub async fn put_input(&self, key: &str, bytes: Vec<u8>) -> Result<(), opendal::Error> {
        debug!(key, size = bytes.len(), "Staging input object");
        self.input.write(key, bytes).await?;
        Ok(())
    }

    pub async fn list_output(&self, prefix: &str) -> Result<Vec<String>, opendal::Error> {
        let entries: Vec<_> = self.output.lister(prefix).await?.try_collect().await?;
        Ok(entries
            .into_iter()
            .map(|e| e.path().to_string())
            .filter(|p| !p.ends_with('/'))
            .collect())
    }

    pub async fn get_output(&self, key: &str) -> Result<Vec<u8>, opendal::Error> {
        Ok(self.output.read(key).await?.to_vec())
    }

    pub async fn delete_input(&self, key: &str) -> Result<(), opendal::Error> {
        self.input.delete(key).await
    }

    pub async fn delete_output(&self, key: &str) -> Result<(), opendal::Error> {
        self.output.delete(key).await
    }

    pub async fn input_exists(&self, key: &str) -> Result<bool, opendal::Error> {
        self.input.exists(key).await
    }
}
