//! Request tracing and exception reporting.
//!
//! A [`Telemetry`] handle is created once in `main` and lives for the whole
//! process. Handlers receive it through [`crate::AppState`]; the `/chat`
//! resource is wrapped in [`trace_request`]. Sink failures are logged and
//! dropped, so reporting never changes the response a client sees.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web, Error, HttpMessage,
};
use log::{error, info, warn};
use tokio::time::Instant;
use uuid::Uuid;

use crate::error::TelemetryError;
use crate::AppState;

/// Per-request id, stored in request extensions by [`trace_request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

#[derive(Debug, Clone)]
pub struct TraceRecord {
    pub request_id: Uuid,
    pub name: String,
    pub method: String,
    pub path: String,
    pub status: u16,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct ExceptionRecord {
    pub request_id: Option<Uuid>,
    pub kind: String,
    pub message: String,
}

/// Backend that receives traces and exception reports.
pub trait TelemetrySink: Send + Sync {
    fn record_trace(&self, trace: &TraceRecord) -> Result<(), TelemetryError>;

    fn record_exception(&self, exception: &ExceptionRecord) -> Result<(), TelemetryError>;

    fn shutdown(&self) -> Result<(), TelemetryError> {
        Ok(())
    }
}

/// Process-wide telemetry handle.
#[derive(Clone)]
pub struct Telemetry {
    app_name: Arc<str>,
    sink: Arc<dyn TelemetrySink>,
}

impl Telemetry {
    pub fn init(app_name: &str, sink: Arc<dyn TelemetrySink>) -> Self {
        info!("Telemetry initialized for application {}", app_name);
        Self {
            app_name: Arc::from(app_name),
            sink,
        }
    }

    pub fn record_trace(&self, trace: TraceRecord) {
        if let Err(e) = self.sink.record_trace(&trace) {
            warn!("Dropping trace {}: {}", trace.request_id, e);
        }
    }

    pub fn record_exception(
        &self,
        request_id: Option<Uuid>,
        kind: &str,
        err: &dyn std::error::Error,
    ) {
        let exception = ExceptionRecord {
            request_id,
            kind: kind.to_string(),
            message: err.to_string(),
        };
        if let Err(e) = self.sink.record_exception(&exception) {
            warn!("Dropping exception report ({}): {}", exception.kind, e);
        }
    }

    pub fn shutdown(&self) {
        match self.sink.shutdown() {
            Ok(()) => info!("Telemetry for {} shut down", self.app_name),
            Err(e) => warn!("Telemetry shutdown failed: {}", e),
        }
    }
}

/// Default sink: reports through `log` and keeps running totals.
#[derive(Default)]
pub struct LogSink {
    traces: AtomicU64,
    exceptions: AtomicU64,
    closed: AtomicBool,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trace_count(&self) -> u64 {
        self.traces.load(Ordering::Relaxed)
    }

    pub fn exception_count(&self) -> u64 {
        self.exceptions.load(Ordering::Relaxed)
    }

    fn ensure_open(&self) -> Result<(), TelemetryError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TelemetryError::ShutDown);
        }
        Ok(())
    }
}

impl TelemetrySink for LogSink {
    fn record_trace(&self, trace: &TraceRecord) -> Result<(), TelemetryError> {
        self.ensure_open()?;
        self.traces.fetch_add(1, Ordering::Relaxed);
        info!(
            "trace {} {} {} {} -> {} in {:.2}ms",
            trace.request_id,
            trace.name,
            trace.method,
            trace.path,
            trace.status,
            trace.duration.as_secs_f64() * 1000.0
        );
        Ok(())
    }

    fn record_exception(&self, exception: &ExceptionRecord) -> Result<(), TelemetryError> {
        self.ensure_open()?;
        self.exceptions.fetch_add(1, Ordering::Relaxed);
        let request_id = exception
            .request_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        error!(
            "exception {} [{}]: {}",
            request_id, exception.kind, exception.message
        );
        Ok(())
    }

    fn shutdown(&self) -> Result<(), TelemetryError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(TelemetryError::ShutDown);
        }
        info!(
            "Telemetry totals: {} traces, {} exceptions",
            self.trace_count(),
            self.exception_count()
        );
        Ok(())
    }
}

/// Middleware that traces one resource: assigns a [`RequestId`], times the
/// inner service and records the outcome.
pub async fn trace_request(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let request_id = Uuid::new_v4();
    req.extensions_mut().insert(RequestId(request_id));

    let telemetry = req
        .app_data::<web::Data<AppState>>()
        .map(|state| state.telemetry.clone());
    let method = req.method().to_string();
    let path = req.path().to_string();
    let name = req
        .request()
        .match_pattern()
        .unwrap_or_else(|| path.clone());

    let started = Instant::now();
    let result = next.call(req).await;
    let duration = started.elapsed();

    let status = match &result {
        Ok(res) => res.status().as_u16(),
        Err(e) => e.as_response_error().status_code().as_u16(),
    };

    if let Some(telemetry) = telemetry {
        telemetry.record_trace(TraceRecord {
            request_id,
            name,
            method,
            path,
            status,
            duration,
        });
    }

    result
}
