//! Test doubles shared by the unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::completion::{
    Choice, CompletionRequest, CompletionResponse, CompletionService, ResponseMessage, Usage,
};
use crate::config::Config;
use crate::error::{CompletionError, TelemetryError};
use crate::telemetry::{ExceptionRecord, Telemetry, TelemetrySink, TraceRecord};
use crate::AppState;

enum Reply {
    Success(CompletionResponse),
    Failure(String),
}

/// Completion service returning a canned reply and remembering every request.
pub struct StubCompletion {
    reply: Reply,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl StubCompletion {
    pub fn replying(content: Option<&str>, model: &str, total_tokens: u64) -> Self {
        Self::with_response(CompletionResponse {
            choices: vec![Choice {
                message: ResponseMessage {
                    content: content.map(str::to_string),
                },
            }],
            model: model.to_string(),
            usage: Usage { total_tokens },
        })
    }

    pub fn with_response(response: CompletionResponse) -> Self {
        Self {
            reply: Reply::Success(response),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Reply::Failure(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for StubCompletion {
    async fn create_chat_completion(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Reply::Success(response) => Ok(response.clone()),
            Reply::Failure(message) => Err(CompletionError::Other(message.clone())),
        }
    }
}

/// Sink that keeps everything it receives.
#[derive(Default)]
pub struct RecordingSink {
    traces: Mutex<Vec<TraceRecord>>,
    exceptions: Mutex<Vec<ExceptionRecord>>,
}

impl RecordingSink {
    pub fn traces(&self) -> Vec<TraceRecord> {
        self.traces.lock().unwrap().clone()
    }

    pub fn exceptions(&self) -> Vec<ExceptionRecord> {
        self.exceptions.lock().unwrap().clone()
    }
}

impl TelemetrySink for RecordingSink {
    fn record_trace(&self, trace: &TraceRecord) -> Result<(), TelemetryError> {
        self.traces.lock().unwrap().push(trace.clone());
        Ok(())
    }

    fn record_exception(&self, exception: &ExceptionRecord) -> Result<(), TelemetryError> {
        self.exceptions.lock().unwrap().push(exception.clone());
        Ok(())
    }
}

/// Sink whose every call fails.
pub struct FailingSink;

impl TelemetrySink for FailingSink {
    fn record_trace(&self, _trace: &TraceRecord) -> Result<(), TelemetryError> {
        Err(TelemetryError::Unavailable("collector offline".to_string()))
    }

    fn record_exception(&self, _exception: &ExceptionRecord) -> Result<(), TelemetryError> {
        Err(TelemetryError::Unavailable("collector offline".to_string()))
    }

    fn shutdown(&self) -> Result<(), TelemetryError> {
        Err(TelemetryError::Unavailable("collector offline".to_string()))
    }
}

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "OPENAI_API_KEY" => Some("sk-test".to_string()),
        _ => None,
    })
    .unwrap()
}

pub fn test_state(
    completion: Arc<dyn CompletionService>,
    sink: Arc<dyn TelemetrySink>,
) -> AppState {
    AppState {
        completion,
        telemetry: Telemetry::init("test-app", sink),
        config: test_config(),
    }
}
