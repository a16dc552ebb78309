use crate::config::Config;
use crate::engines;
use crate::error::PipelineError;
use crate::pipeline::{Outcome, Pipeline, PipelineResult};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub config: Arc<Config>,
}

/// Pipeline response
#[derive(Serialize)]
pub struct ProcessResponse {
    #[serde(flatten)]
    pub result: PipelineResult,
    pub processing_time_ms: u64,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Server info response
#[derive(Serialize)]
pub struct InfoResponse {
    pub version: String,
    pub engine: String,
    pub available_engines: Vec<String>,
    pub analysis_model: String,
    pub supported_languages: Vec<String>,
    pub max_file_size_bytes: usize,
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let max_file_size = state.config.max_file_size;

    Router::new()
        .route("/process", post(handle_process))
        .route("/health", get(handle_health))
        .route("/info", get(handle_info))
        .layer(DefaultBodyLimit::max(max_file_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    let pipeline = tokio::task::spawn_blocking({
        let config = config.clone();
        move || Pipeline::from_config(&config)
    })
    .await??;
    let addr = format!("{}:{}", config.host, config.port);

    let state = AppState {
        pipeline: Arc::new(pipeline),
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Handle screenshot uploads
async fn handle_process(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ProcessResponse>, PipelineError> {
    let start = Instant::now();

    let mut file_data: Option<Bytes> = None;
    let mut content_type: Option<String> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PipelineError::InvalidRequest(format!("Failed to parse multipart: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        content_type = field.content_type().map(|s| s.to_string());
        file_name = field.file_name().map(|s| s.to_string());
        file_data = Some(field.bytes().await.map_err(|e| {
            PipelineError::InvalidRequest(format!("Failed to read file data: {}", e))
        })?);
    }

    let data = file_data.ok_or(PipelineError::MissingFile)?;

    if data.len() > state.config.max_file_size {
        return Err(PipelineError::ImageTooLarge {
            size: data.len(),
            max: state.config.max_file_size,
        });
    }

    let mime = content_type.unwrap_or_else(|| "application/octet-stream".to_string());
    if !mime.starts_with("image/") {
        tracing::warn!("Received file with content type: {}", mime);
    }

    // Diagnostic images are saved in the uploaded format
    let extension = match mime.as_str() {
        "image/png" => ".png",
        "image/jpeg" => ".jpg",
        "image/gif" => ".gif",
        "image/bmp" => ".bmp",
        "image/webp" => ".webp",
        "image/tiff" => ".tiff",
        _ => extension_from_name(file_name.as_deref()),
    };

    let mut temp_file = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(extension)
        .tempfile()
        .map_err(|e| PipelineError::Internal(format!("Failed to create temp file: {}", e)))?;

    temp_file
        .write_all(&data)
        .map_err(|e| PipelineError::Internal(format!("Failed to write temp file: {}", e)))?;

    let pipeline = state.pipeline.clone();
    let outcome = tokio::task::spawn_blocking(move || pipeline.process(temp_file.path()))
        .await
        .map_err(|e| PipelineError::Internal(format!("Pipeline task failed: {}", e)))??;

    let result = match outcome {
        Outcome::Annotated(result) => result,
        Outcome::Skipped(e) => return Err(e),
    };

    let processing_time_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        "Processed screenshot in {}ms, fingerprint: {}, text length: {}",
        processing_time_ms,
        result.fingerprint,
        result.annotated_text.len()
    );

    Ok(Json(ProcessResponse {
        result,
        processing_time_ms,
    }))
}

fn extension_from_name(name: Option<&str>) -> &'static str {
    let ext = name
        .and_then(|n| n.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => ".png",
        Some("jpg") | Some("jpeg") => ".jpg",
        Some("gif") => ".gif",
        Some("bmp") => ".bmp",
        Some("webp") => ".webp",
        Some("tif") | Some("tiff") => ".tiff",
        _ => ".png",
    }
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle info requests
async fn handle_info(State(state): State<AppState>) -> impl IntoResponse {
    let engine = state.pipeline.engine();
    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine: engine.name().to_string(),
        available_engines: engines::available().into_iter().map(String::from).collect(),
        analysis_model: state.pipeline.analyzer().model_name().to_string(),
        supported_languages: engine.supported_languages(),
        max_file_size_bytes: state.config.max_file_size,
    })
}
