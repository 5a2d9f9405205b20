//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::pipeline::ScanError;

/// Body returned when the request carries no usable image.
pub const IMAGE_NOT_FOUND: &str = "Image data not found";

/// Body returned when no medicine could be matched.
pub const NOT_RECOGNIZED: &str = "Medicine not recognized";

/// Errors surfaced by the HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or empty image field, or a body that is not a JSON object
    #[error("Image data not found")]
    ImageNotFound,

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ImageNotFound => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Scan(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Scan failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Rejected request");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
