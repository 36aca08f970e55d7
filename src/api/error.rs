use crate::services::compression::CompressError;
use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Form missing, malformed, or lacking a `file` field
    #[error("Error uploading file: {0}")]
    Upload(String),

    #[error("Error saving uploaded file: {0}")]
    Save(#[source] std::io::Error),

    #[error("Error writing uploaded file: {0}")]
    Write(#[source] std::io::Error),

    #[error("Unsupported file type")]
    UnsupportedFileType,

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    #[error("Error compressing file: {0}")]
    Compression(#[from] CompressError),
}

impl AppError {
    /// Classify a multipart stream failure; body-limit overruns become 413.
    pub fn from_multipart(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(err.body_text())
        } else {
            AppError::Upload(err.body_text())
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::UnsupportedFileType => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Upload(_)
            | AppError::Save(_)
            | AppError::Write(_)
            | AppError::Compression(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!("{}", message);
        } else {
            tracing::warn!("{}", message);
        }

        // Plain-text body, matching what the upload form expects
        (status, message).into_response()
    }
}
