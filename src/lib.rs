//! Diligence Document Intake Service
//!
//! A Rust service that ingests uploaded business documents, extracts their
//! text through an external OCR provider (with automatic batch fallback for
//! large documents), and validates that the content is analyzable business
//! material before it reaches downstream analysis.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::services::IntakePipeline;

/// Shared handles injected into request handlers.
///
/// Collaborator clients are constructed once in `main` and passed down
/// explicitly; no module holds ambient client state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<IntakePipeline>,
    pub limiter: Arc<Semaphore>,
    pub config: Arc<Config>,
}
