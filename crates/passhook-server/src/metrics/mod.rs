//! Prometheus metrics for Passhook
//!
//! Exposes metrics at `/metrics` endpoint in Prometheus format.
//! The recording helpers are no-ops until a recorder is installed.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use passhook_core::types::CredentialStatus;
use passhook_core::{Error, Result};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::server::AppState;

/// Metric names
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "passhook_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "passhook_http_request_duration_seconds";

    // Hook metrics
    pub const VALIDATIONS_TOTAL: &str = "passhook_validations_total";
    pub const VALIDATION_DURATION_SECONDS: &str = "passhook_validation_duration_seconds";
    pub const UNAUTHORIZED_REQUESTS_TOTAL: &str = "passhook_unauthorized_requests_total";

    // System metrics
    pub const UPTIME_SECONDS: &str = "passhook_uptime_seconds";
    pub const INFO: &str = "passhook_info";
}

/// Metrics recorder
#[derive(Clone)]
pub struct MetricsRecorder {
    handle: PrometheusHandle,
    start_time: Instant,
}

impl MetricsRecorder {
    /// Install the process-wide Prometheus recorder
    pub fn install() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| Error::InternalError(format!("failed to install Prometheus recorder: {}", e)))?;

        gauge!(names::INFO, "version" => passhook_core::VERSION).set(1.0);

        Ok(Self {
            handle,
            start_time: Instant::now(),
        })
    }

    /// Get metrics output in Prometheus format
    pub fn render(&self) -> String {
        gauge!(names::UPTIME_SECONDS).set(self.start_time.elapsed().as_secs_f64());

        self.handle.render()
    }
}

/// Record one credential check
pub fn record_validation(backend: &'static str, status: CredentialStatus, elapsed: Duration) {
    counter!(
        names::VALIDATIONS_TOTAL,
        "backend" => backend,
        "result" => status.as_str()
    )
    .increment(1);

    histogram!(names::VALIDATION_DURATION_SECONDS, "backend" => backend)
        .record(elapsed.as_secs_f64());
}

/// Record a request rejected by the shared-secret check
pub fn record_unauthorized() {
    counter!(names::UNAUTHORIZED_REQUESTS_TOTAL).increment(1);
}

fn record_http_request(method: &str, status: u16, duration_secs: f64) {
    counter!(
        names::HTTP_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "status" => status.to_string(),
        "status_class" => format!("{}xx", status / 100)
    )
    .increment(1);

    histogram!(
        names::HTTP_REQUEST_DURATION_SECONDS,
        "method" => method.to_string()
    )
    .record(duration_secs);
}

/// Axum middleware for recording HTTP metrics
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16();

    record_http_request(&method, status, duration);

    debug!(
        method = %method,
        path = %path,
        status = %status,
        duration_ms = %(duration * 1000.0),
        "Request completed"
    );

    response
}

/// Handler for /metrics endpoint
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics {
        Some(metrics) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            metrics.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
