use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::{CompletionRequest, CompletionResponse, CompletionService};
use crate::config::Config;
use crate::error::CompletionError;

// A wrapper for an OpenAI-compatible chat completions API
pub struct OpenAiClient {
    api_base: String,
    api_key: String,
    client: Client,
}

impl OpenAiClient {
    pub fn new(api_base: &str, api_key: &str) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.api_base, &config.api_key)
    }
}

#[async_trait]
impl CompletionService for OpenAiClient {
    async fn create_chat_completion(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        let url = format!("{}/chat/completions", self.api_base);

        info!(
            "Requesting completion from {} with model {} (max_tokens: {})",
            url, request.model, request.max_tokens
        );
        debug!("Messages: {:?}", request.messages);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message: api_error_message(status, &body),
            });
        }

        debug!("Response body: {}", body);

        serde_json::from_str(&body).map_err(|e| CompletionError::InvalidResponse(e.to_string()))
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Pulls `error.message` out of an API error body, falling back to the raw text.
fn api_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return envelope.error.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("API request failed with status {}", status)
    } else {
        trimmed.to_string()
    }
}
