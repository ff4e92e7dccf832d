//! Prometheus Metrics Definitions
//!
//! Defines all TALENT metrics with appropriate labels and types.
//! Exposes a /metrics endpoint for Prometheus scraping.

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
/// Covers: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Store operation latency buckets (seconds)
const STORE_LATENCY_BUCKETS: &[f64] =
    &[0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0];

/// Global metrics instance - initialized once at startup
pub static METRICS: Lazy<ApiResult<TalentMetrics>> = Lazy::new(TalentMetrics::new);

/// Container for all TALENT metrics.
#[derive(Clone)]
pub struct TalentMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Candidate upsert counter - labels: action (inserted/updated/failed)
    pub candidate_upserts_total: CounterVec,

    /// Cache population counter - labels: result (stored/failed)
    pub candidate_cache_writes_total: CounterVec,

    /// Store operation counter - labels: operation, status
    pub store_operations_total: CounterVec,

    /// Store operation duration histogram - labels: operation
    pub store_operation_duration_seconds: HistogramVec,
}

impl TalentMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "talent_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_requests_total: {}", e)))?,

            http_request_duration_seconds: register_histogram_vec!(
                "talent_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_request_duration_seconds: {}", e)))?,

            candidate_upserts_total: register_counter_vec!(
                "talent_candidate_upserts_total",
                "Total candidate upserts by outcome",
                &["action"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register candidate_upserts_total: {}", e)))?,

            candidate_cache_writes_total: register_counter_vec!(
                "talent_candidate_cache_writes_total",
                "Total candidate cache writes after commit",
                &["result"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register candidate_cache_writes_total: {}", e)))?,

            store_operations_total: register_counter_vec!(
                "talent_store_operations_total",
                "Total number of candidate store operations",
                &["operation", "status"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register store_operations_total: {}", e)))?,

            store_operation_duration_seconds: register_histogram_vec!(
                "talent_store_operation_duration_seconds",
                "Candidate store operation duration in seconds",
                &["operation"],
                STORE_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register store_operation_duration_seconds: {}", e)))?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, status_str.as_str()])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Record the outcome of one upsert.
    ///
    /// `action` is `"inserted"`, `"updated"` or `"failed"`. `cached` is
    /// ignored for failed upserts, which never reach the cache.
    pub fn record_upsert(&self, action: &str, cached: bool) {
        self.candidate_upserts_total
            .with_label_values(&[action])
            .inc();
        if action != "failed" {
            let result = if cached { "stored" } else { "failed" };
            self.candidate_cache_writes_total
                .with_label_values(&[result])
                .inc();
        }
    }

    /// Record a store operation.
    pub fn record_store_operation(&self, operation: &str, success: bool, duration_secs: f64) {
        let status = if success { "success" } else { "error" };
        self.store_operations_total
            .with_label_values(&[operation, status])
            .inc();
        self.store_operation_duration_seconds
            .with_label_values(&[operation])
            .observe(duration_secs);
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Observability",
    responses(
        (status = 200, description = "Prometheus metrics in text format", content_type = "text/plain"),
        (status = 500, description = "Failed to encode metrics"),
    ),
)]
pub async fn metrics_handler() -> impl IntoResponse {
    // Make sure the TALENT collectors are registered before the first scrape.
    if let Err(e) = METRICS.as_ref() {
        tracing::warn!(error = %e, "Metrics registry unavailable");
    }

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}
