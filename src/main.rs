use std::env;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use diligence::config::Config;
use diligence::handlers::{health_handler, intake_handler, ready_handler};
use diligence::middleware::{auth_middleware, logging_middleware};
use diligence::services::{
    ContentValidator, IntakePipeline, ObjectStage, PermissiveClassifier, RemoteClassifier,
    RemoteOcrClient, SecondaryClassifier,
};
use diligence::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "diligence=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env()?);

    tracing::info!("Starting Diligence Document Intake Service");
    tracing::info!("Max file size: {}MB", config.max_file_size_mb);
    tracing::info!("OCR endpoint: {}", config.ocr_endpoint);
    tracing::info!("Batch timeout: {}s", config.batch_timeout_seconds);

    // Collaborator clients are built once here and injected; nothing else
    // in the crate constructs its own client.
    let http = reqwest::Client::new();
    let ocr = Arc::new(RemoteOcrClient::new(http.clone(), config.ocr_endpoint.clone()));
    let stage = Arc::new(ObjectStage::from_config(&config)?);

    let secondary: Arc<dyn SecondaryClassifier> = match &config.classifier_endpoint {
        Some(endpoint) => Arc::new(RemoteClassifier::new(http, endpoint.clone())),
        None => {
            tracing::warn!("CLASSIFIER_ENDPOINT not set, low-confidence documents pass unchecked");
            Arc::new(PermissiveClassifier)
        }
    };

    let validator = ContentValidator::new(secondary);
    let pipeline = Arc::new(IntakePipeline::new(ocr, stage, validator, &config));

    let state = AppState {
        pipeline,
        limiter: Arc::new(Semaphore::new(config.max_concurrent_requests)),
        config: config.clone(),
    };

    // Build our application with routes
    let app = Router::new()
        // Health endpoints (no auth required)
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        // API endpoints (auth required)
        .route("/api/v1/intake", post(intake_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(config.max_file_size_bytes()))
                .layer(axum::middleware::from_fn(auth_middleware))
                .layer(axum::middleware::from_fn(logging_middleware)),
        )
        .with_state(state);

    // Determine port from environment (container platform compatibility)
    let port = env::var("PORT")
        .unwrap_or_else(|_| config.server_port.to_string())
        .parse::<u16>()
        .unwrap_or(config.server_port);

    let addr = format!("{}:{}", config.server_host, port);

    tracing::info!("Server listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
