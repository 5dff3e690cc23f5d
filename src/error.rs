use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    /// The `file` field was present but carried zero bytes
    #[error("Empty file")]
    EmptyInput,

    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    #[error("Recognition failed: {0}")]
    RecognitionError(String),

    #[error("Preprocessing failed: {0}")]
    PreprocessingError(String),

    #[error("Failed to initialize OCR engine: {0}")]
    InitializationError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Image too large: {size} bytes (max: {max} bytes)")]
    ImageTooLarge { size: usize, max: usize },

    /// The body limit cut the upload off before its size was known
    #[error("Upload exceeds the {max} byte limit")]
    UploadTooLarge { max: usize },

    #[error("Missing file in request")]
    MissingFile,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OcrError {
    /// Status code and machine-readable code for the HTTP boundary
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            OcrError::EmptyInput => (StatusCode::BAD_REQUEST, "EMPTY_FILE"),
            // Undecodable uploads stay a 500 to match what existing clients expect
            OcrError::DecodeError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DECODE_ERROR"),
            OcrError::RecognitionError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "RECOGNITION_ERROR")
            }
            OcrError::PreprocessingError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PREPROCESSING_ERROR")
            }
            OcrError::InitializationError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INIT_ERROR"),
            OcrError::InvalidConfig(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INVALID_CONFIG"),
            OcrError::ImageTooLarge { .. } | OcrError::UploadTooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, "IMAGE_TOO_LARGE")
            }
            OcrError::MissingFile => (StatusCode::BAD_REQUEST, "MISSING_FILE"),
            OcrError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            OcrError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
            OcrError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

impl IntoResponse for OcrError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!("Request failed ({}): {}", code, self);
        } else {
            tracing::warn!("Request rejected ({}): {}", code, self);
        }

        let body = Json(ErrorResponse {
            success: false,
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_message_is_exact() {
        assert_eq!(OcrError::EmptyInput.to_string(), "Empty file");
    }

    #[test]
    fn test_user_errors_map_to_bad_request() {
        assert_eq!(
            OcrError::EmptyInput.status_and_code().0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            OcrError::MissingFile.status_and_code().0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            OcrError::InvalidRequest("bad".into()).status_and_code().0,
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_decode_and_recognition_errors_are_server_errors() {
        let (status, code) = OcrError::DecodeError("garbage".into()).status_and_code();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "DECODE_ERROR");

        let (status, code) = OcrError::RecognitionError("boom".into()).status_and_code();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "RECOGNITION_ERROR");
    }

    #[test]
    fn test_timeout_maps_to_gateway_timeout() {
        assert_eq!(
            OcrError::Timeout(5).status_and_code().0,
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_oversized_uploads_share_code() {
        let (status, code) = OcrError::ImageTooLarge { size: 10, max: 5 }.status_and_code();
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(code, "IMAGE_TOO_LARGE");

        let err = OcrError::UploadTooLarge { max: 1024 };
        assert_eq!(err.status_and_code(), (StatusCode::PAYLOAD_TOO_LARGE, "IMAGE_TOO_LARGE"));
        assert_eq!(err.to_string(), "Upload exceeds the 1024 byte limit");
    }

    #[test]
    fn test_into_response_sets_status() {
        let response = OcrError::EmptyInput.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
