use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /chat`. `message` is not type-checked: any JSON value is
/// forwarded as the user turn, and a missing or `null` message stays `None`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<Value>,
}

/// `response` is `null` when the first choice carried no text.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: Option<String>,
    pub model: String,
    pub tokens_used: u64,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
