//! エラー型定義 (ep-api)

use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// ep-api のエラー型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Server error: {0}")]
    Server(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Message not found: {0}")]
    MessageNotFound(u64),

    #[error("Preview not found: {0}")]
    PreviewNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Core error: {0}")]
    Core(#[from] ep_core::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::SessionNotFound(_) | Self::MessageNotFound(_) | Self::PreviewNotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Core(ep_core::Error::InvalidSessionId(_)) => StatusCode::BAD_REQUEST,
            Self::Server(_) | Self::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Generic API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error half of every handler result
pub type HandlerError = (StatusCode, Json<ErrorResponse>);

impl From<ApiError> for HandlerError {
    fn from(err: ApiError) -> Self {
        (
            err.status(),
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        )
    }
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, ApiError>;
