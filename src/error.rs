use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("File not found: {}", .0.display())]
    NotFoundError(PathBuf),

    #[error("Failed to read image: {0}")]
    ReadError(String),

    #[error("Failed to compute image hash: {0}")]
    HashError(String),

    #[error("OCR failed: {0}")]
    OcrError(String),

    #[error("Linguistic analysis failed: {0}")]
    AnalysisError(String),

    #[error("Failed to save annotated image: {0}")]
    DiagnosticWriteError(String),

    #[error("Failed to initialize: {0}")]
    InitializationError(String),

    #[error("Image too large: {size} bytes (max: {max} bytes)")]
    ImageTooLarge { size: usize, max: usize },

    #[error("Missing file in request")]
    MissingFile,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Stable machine-readable code for logs and HTTP bodies
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::NotFoundError(_) => "NOT_FOUND",
            PipelineError::ReadError(_) => "READ_ERROR",
            PipelineError::HashError(_) => "HASH_ERROR",
            PipelineError::OcrError(_) => "OCR_ERROR",
            PipelineError::AnalysisError(_) => "ANALYSIS_ERROR",
            PipelineError::DiagnosticWriteError(_) => "DIAGNOSTIC_WRITE_ERROR",
            PipelineError::InitializationError(_) => "INIT_ERROR",
            PipelineError::ImageTooLarge { .. } => "IMAGE_TOO_LARGE",
            PipelineError::MissingFile => "MISSING_FILE",
            PipelineError::InvalidRequest(_) => "INVALID_REQUEST",
            PipelineError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the orchestrator lets this error escape instead of skipping the image
    pub fn is_fatal(&self) -> bool {
        matches!(self, PipelineError::DiagnosticWriteError(_))
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = match &self {
            PipelineError::NotFoundError(_)
            | PipelineError::ReadError(_)
            | PipelineError::HashError(_)
            | PipelineError::OcrError(_)
            | PipelineError::AnalysisError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PipelineError::DiagnosticWriteError(_)
            | PipelineError::InitializationError(_)
            | PipelineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PipelineError::ImageTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            PipelineError::MissingFile | PipelineError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: self.kind().to_string(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_diagnostic_write_is_fatal() {
        assert!(PipelineError::DiagnosticWriteError("disk full".into()).is_fatal());
        assert!(!PipelineError::ReadError("bad png".into()).is_fatal());
        assert!(!PipelineError::OcrError("model".into()).is_fatal());
        assert!(!PipelineError::NotFoundError(PathBuf::from("a.png")).is_fatal());
    }

    #[test]
    fn test_skip_errors_map_to_unprocessable() {
        let response = PipelineError::ReadError("bad".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = PipelineError::DiagnosticWriteError("bad".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
