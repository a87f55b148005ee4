use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::web::models::ErrorResponse;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,
}

/// Failures talking to the completion service.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("invalid completion response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Other(String),
}

/// Everything that can go wrong while serving `POST /chat`.
///
/// All variants map to a 500; the body carries the Display text.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("completion returned no choices")]
    EmptyCompletion,
}

impl ChatError {
    /// Short label used when reporting to telemetry.
    pub fn kind(&self) -> &'static str {
        match self {
            ChatError::InvalidBody(_) => "InvalidBody",
            ChatError::Completion(CompletionError::Api { .. }) => "CompletionApi",
            ChatError::Completion(CompletionError::Transport(_)) => "CompletionTransport",
            ChatError::Completion(CompletionError::InvalidResponse(_)) => "CompletionInvalidResponse",
            ChatError::Completion(CompletionError::Other(_)) => "Completion",
            ChatError::EmptyCompletion => "EmptyCompletion",
        }
    }
}

impl ResponseError for ChatError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("telemetry sink unavailable: {0}")]
    Unavailable(String),

    #[error("telemetry already shut down")]
    ShutDown,
}
