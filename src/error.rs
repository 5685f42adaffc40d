//! Error types for the pdf-pager HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::document::DocumentError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// The named resource is missing
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {message}")]
    BadRequest {
        message: String,
        total_pages: Option<usize>,
    },

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Request timed out")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Invalid page index, reporting the known page count to the client
    pub fn invalid_page(page: impl std::fmt::Display, total_pages: Option<usize>) -> Self {
        AppError::BadRequest {
            message: format!("Invalid page number: {}", page),
            total_pages,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Document(err.into())
    }
}

/// Error response body
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<usize>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut total_pages = None;

        let (status, code, error, message) = match &self {
            AppError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "PDF not found",
                format!("{} does not exist", what),
            ),
            AppError::BadRequest {
                message,
                total_pages: pages,
            } => {
                total_pages = *pages;
                (
                    StatusCode::BAD_REQUEST,
                    "INVALID_PAGE",
                    "Invalid page number",
                    message.clone(),
                )
            }
            AppError::Document(DocumentError::PageOutOfRange { page, page_count }) => {
                total_pages = *page_count;
                (
                    StatusCode::BAD_REQUEST,
                    "INVALID_PAGE",
                    "Invalid page number",
                    format!("Page {} is out of range", page),
                )
            }
            AppError::Document(e) if e.is_not_found() => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "PDF not found",
                "The source document is missing".to_string(),
            ),
            AppError::Document(e) => {
                tracing::error!("Document error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXTRACTION_FAILED",
                    "Failed to extract page",
                    "The requested page could not be produced".to_string(),
                )
            }
            AppError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "TIMEOUT",
                "Request timed out",
                "The request took too long to complete".to_string(),
            ),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "Internal error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
            code,
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
            total_pages,
        });

        (status, body).into_response()
    }
}
