use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lmchat_context::ContextError;
use lmchat_media::MediaError;
use lmchat_persist::PersistError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid thread: {0}")]
    InvalidThread(String),

    #[error("Invalid text: {0}")]
    InvalidText(String),

    #[error("Invalid title: {0}")]
    InvalidTitle(String),

    #[error("Invalid media request: {0}")]
    InvalidMedia(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("Model request failed: {0}")]
    Llm(anyhow::Error),

    #[error("OCR request failed: {0}")]
    Ocr(MediaError),

    #[error("Audio request failed: {0}")]
    Audio(MediaError),

    #[error("Persistence error: {0}")]
    Persist(PersistError),
}

impl ApiError {
    /// Stable machine-readable code returned next to the message
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidThread(_) => "invalid-thread",
            ApiError::InvalidText(_) => "invalid-text",
            ApiError::InvalidTitle(_) => "invalid-title",
            ApiError::InvalidMedia(_) => "invalid-media",
            ApiError::BadRequest(_) => "invalid-request",
            ApiError::ThreadNotFound(_) => "thread-not-found",
            ApiError::Llm(_) => "llm-error",
            ApiError::Ocr(_) => "ocr-error",
            ApiError::Audio(_) => "audio-error",
            ApiError::Persist(_) => "storage-error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidThread(_)
            | ApiError::InvalidText(_)
            | ApiError::InvalidTitle(_)
            | ApiError::InvalidMedia(_)
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ThreadNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Llm(_) | ApiError::Ocr(_) | ApiError::Audio(_) => StatusCode::BAD_GATEWAY,
            ApiError::Persist(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PersistError> for ApiError {
    fn from(err: PersistError) -> Self {
        match err {
            PersistError::InvalidId(id) => ApiError::InvalidThread(id),
            PersistError::ThreadNotFound(id) => ApiError::ThreadNotFound(id),
            other => ApiError::Persist(other),
        }
    }
}

impl From<ContextError> for ApiError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::ThreadNotFound(id) => ApiError::ThreadNotFound(id),
            ContextError::Persist(e) => e.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Llm(ref e) => {
                tracing::error!("Model error: {:#}", e);
                self.to_string()
            }
            ApiError::Ocr(ref e) | ApiError::Audio(ref e) => {
                tracing::error!("Media error: {}", e);
                self.to_string()
            }
            ApiError::Persist(ref e) => {
                tracing::error!("Persistence error: {}", e);
                "Storage error".to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(json!({
            "error": message,
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
