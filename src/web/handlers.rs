use actix_web::{web, HttpMessage, HttpRequest, HttpResponse, Responder};
use log::{debug, error, info, warn};
use serde_json::{json, Value};

use crate::completion::CompletionRequest;
use crate::error::ChatError;
use crate::telemetry::RequestId;
use crate::web::models::{ChatRequest, ChatResponse};
use crate::AppState;

// Health check endpoint
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "healthy" }))
}

// Chat API endpoint
//
// The body is decoded here rather than by an extractor so that malformed input
// takes the same error path as upstream failures.
pub async fn chat(
    data: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ChatError> {
    let request_id = req.extensions().get::<RequestId>().map(|id| id.0);

    match respond(&data, &body).await {
        Ok(reply) => {
            info!(
                "Chat reply from model {} ({} tokens)",
                reply.model, reply.tokens_used
            );
            Ok(HttpResponse::Ok().json(reply))
        }
        Err(e) => {
            error!("Chat request failed: {}", e);
            data.telemetry.record_exception(request_id, e.kind(), &e);
            Err(e)
        }
    }
}

async fn respond(state: &AppState, body: &[u8]) -> Result<ChatResponse, ChatError> {
    let request: ChatRequest = serde_json::from_slice(body)?;

    match &request.message {
        Some(Value::String(message)) => {
            info!("Chat request ({} chars)", message.chars().count());
            debug!("Message: {}", message);
        }
        Some(other) => warn!("Chat request message is not a string; forwarding {}", other),
        None => warn!("Chat request has no message; forwarding null content"),
    }

    let completion_request = CompletionRequest::chat(
        &state.config.model,
        &state.config.system_prompt,
        request.message,
        state.config.max_tokens,
    );

    let completion = state
        .completion
        .create_chat_completion(&completion_request)
        .await?;

    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or(ChatError::EmptyCompletion)?;
    if choice.message.content.is_none() {
        warn!("Completion choice carried no content; replying with null");
    }

    Ok(ChatResponse {
        response: choice.message.content,
        model: completion.model,
        tokens_used: completion.usage.total_tokens,
    })
}
