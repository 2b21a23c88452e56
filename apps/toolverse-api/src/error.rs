//! Error types for the Toolverse API

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use toolverse_core::{ErrorKind, PdfToolError};

use crate::geo::GeoError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing IP")]
    MissingIp,

    #[error("Invalid IP")]
    InvalidIp,

    #[error("Upstream lookup failed: {0}")]
    Upstream(#[from] GeoError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Pdf(#[from] PdfToolError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::MissingIp => (StatusCode::BAD_REQUEST, "Missing IP".to_string()),
            ApiError::InvalidIp => (StatusCode::BAD_REQUEST, "Invalid IP".to_string()),
            ApiError::Upstream(e) => {
                tracing::error!("Upstream lookup failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch data".to_string(),
                )
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Pdf(e) => match e.kind() {
                ErrorKind::Validation => (StatusCode::BAD_REQUEST, e.to_string()),
                ErrorKind::Decode => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
                ErrorKind::Assembly | ErrorKind::Superseded => {
                    tracing::error!("PDF processing failed: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Failed to process PDF".to_string(),
                    )
                }
            },
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
