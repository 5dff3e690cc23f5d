use crate::aggregator::ExtractionResponse;
use crate::config::Config;
use crate::engine::TextRecognizer;
use crate::engines;
use crate::error::OcrError;
use crate::service::OcrService;
use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<OcrService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, engine: Arc<dyn TextRecognizer>) -> Self {
        Self {
            service: Arc::new(OcrService::new(&config, engine)),
            config: Arc::new(config),
        }
    }
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub engine: String,
    pub description: String,
    pub version: String,
}

/// Readiness response
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub engine: String,
    pub ready: bool,
    pub gpu: bool,
    pub languages: Vec<String>,
}

/// Build the router with all routes and middleware
pub fn router(state: AppState) -> Router {
    let body_limit = state
        .config
        .max_file_size
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/ocr", post(handle_ocr))
        .route("/health", get(handle_health))
        .route("/test", get(handle_test))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    config.validate()?;

    // Model loading may download files and blocks for a while
    let engine_config = config.clone();
    let engine =
        tokio::task::spawn_blocking(move || engines::create_engine(&engine_config)).await??;

    tracing::info!(
        "Engine {} ready (languages: {})",
        engine.name(),
        engine.supported_languages().join(", ")
    );

    let addr = format!("{}:{}", config.host, config.port);
    let app = router(AppState::new(config, engine));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Handle OCR requests
async fn handle_ocr(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractionResponse>, OcrError> {
    let start = Instant::now();

    let mut file_data: Option<Bytes> = None;

    // Parse multipart form
    let max = state.config.max_file_size;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max, "Failed to parse multipart"))?
    {
        if field.name() == Some("file") {
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, max, "Failed to read file data"))?,
            );
        }
    }

    // Validate file was provided
    let data = file_data.ok_or(OcrError::MissingFile)?;

    if data.len() > state.config.max_file_size {
        return Err(OcrError::ImageTooLarge {
            size: data.len(),
            max: state.config.max_file_size,
        });
    }

    let timeout_secs = state.config.request_timeout_secs;
    let service = state.service.clone();
    let task = tokio::task::spawn_blocking(move || service.extract(&data));

    let response = match tokio::time::timeout(Duration::from_secs(timeout_secs), task).await {
        Ok(joined) => {
            joined.map_err(|e| OcrError::Internal(format!("OCR worker failed: {}", e)))??
        }
        Err(_) => {
            // The blocking task cannot be cancelled and keeps its worker thread
            tracing::warn!(
                "OCR request exceeded {}s, worker continues in the background",
                timeout_secs
            );
            return Err(OcrError::Timeout(timeout_secs));
        }
    };

    tracing::info!(
        "OCR completed in {}ms, words: {}, text length: {}",
        start.elapsed().as_millis(),
        response.word_count,
        response.text.len()
    );

    Ok(Json(response))
}

/// Body-limit failures surface as oversized uploads, everything else as a bad request
fn multipart_error(err: MultipartError, max: usize, context: &str) -> OcrError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        OcrError::UploadTooLarge { max }
    } else {
        OcrError::InvalidRequest(format!("{}: {}", context, err))
    }
}

/// Handle health check requests
async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        engine: state.service.engine().name().to_string(),
        description: state.service.engine().description().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle readiness requests
async fn handle_test(State(state): State<AppState>) -> impl IntoResponse {
    let engine = state.service.engine();
    Json(ReadinessResponse {
        status: "ok".to_string(),
        engine: engine.name().to_string(),
        ready: true,
        gpu: engine.uses_accelerator(),
        languages: engine.supported_languages(),
    })
}
