//! Error types for the name generator server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Store Error Enum ==
/// Errors raised by the name store's persistence path.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The record sequence could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The store was closed during shutdown and accepts no more records
    #[error("Store is closed")]
    Closed,
}

// == Render Error Enum ==
/// Errors raised while turning certificate HTML into PDF bytes.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The renderer process could not be started or talked to
    #[error("Failed to run PDF renderer '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The renderer exited with a failure status
    #[error("PDF renderer exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    /// The renderer succeeded but produced nothing
    #[error("PDF renderer produced no output")]
    EmptyOutput,
}

// == App Error Enum ==
/// Unified error type for the HTTP layer.
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid request data
    #[error("{0}")]
    InvalidRequest(String),

    /// No route or static file matches the path
    #[error("Not found")]
    NotFound,

    /// Requested template has no content
    #[error("Template '{0}' not found")]
    TemplateNotFound(String),

    /// Certificate could not be rendered
    #[error("PDF generation error: {0}")]
    Render(#[from] RenderError),

    /// Client exceeded its request quota
    #[error("Rate limit exceeded")]
    RateLimited {
        /// Seconds until the client may retry
        retry_after: u64,
    },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::new(msg)),
            AppError::NotFound => (StatusCode::NOT_FOUND, ErrorResponse::new("Not found")),
            AppError::TemplateNotFound(_) | AppError::Render(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(self.to_string()),
            ),
            AppError::RateLimited { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorResponse::new("Rate limit exceeded")
                    .with_message("Please wait before making more requests"),
            ),
            AppError::Internal(msg) => {
                tracing::error!("Internal server error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal server error"),
                )
            }
        };

        let mut response = (status, Json(body)).into_response();
        if let AppError::RateLimited { retry_after } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP layer.
pub type Result<T> = std::result::Result<T, AppError>;
