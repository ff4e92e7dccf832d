//! REST API Routes Module
//!
//! Includes:
//! - Candidate upsert under /api/candidates
//! - Health check endpoints (Kubernetes-compatible)
//! - Prometheus metrics and the OpenAPI document
//! - CORS support for browser-based clients

pub mod candidate;
pub mod health;

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use utoipa::OpenApi;

use crate::config::ApiConfig;
use crate::openapi::ApiDoc;
use crate::state::AppState;
use crate::telemetry::{metrics_handler, observability_middleware};

pub use candidate::create_router as candidate_router;
pub use health::create_router as health_router;

// ============================================================================
// OPENAPI ENDPOINTS
// ============================================================================

/// Handler for /openapi.json endpoint.
async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ============================================================================
// ROUTER
// ============================================================================

/// Where Swagger UI fetches its document. Must differ from /openapi.json,
/// which is routed separately.
#[cfg(feature = "swagger-ui")]
const SWAGGER_DOC_PATH: &str = "/api-docs/openapi.json";

/// Build CORS layer from API configuration.
///
/// An empty origin list allows any origin.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: allowing all origins");
        cors.allow_origin(Any)
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS: restricting origins");
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Create the complete API router.
///
/// - Candidate upsert at POST /api/candidates (also /api/Candidates)
/// - Health checks at /health/*
/// - Metrics at /metrics
/// - OpenAPI document at /openapi.json
/// - Swagger UI at /swagger-ui, reading /api-docs/openapi.json (when the
///   swagger-ui feature is enabled)
///
/// The observability middleware is the outermost layer after CORS, so
/// timed-out requests are recorded with their 408 status.
pub fn create_api_router(state: AppState, config: &ApiConfig) -> Router {
    let mut router = Router::new()
        .nest("/api/candidates", candidate::create_router())
        .nest("/api/Candidates", candidate::create_router())
        .nest("/health", health::create_router())
        .route("/metrics", get(metrics_handler))
        .route("/openapi.json", get(openapi_json))
        .with_state(state);

    #[cfg(feature = "swagger-ui")]
    {
        use utoipa_swagger_ui::SwaggerUi;
        router = router.merge(SwaggerUi::new("/swagger-ui").url(SWAGGER_DOC_PATH, ApiDoc::openapi()));
    }

    router
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(from_fn(observability_middleware))
        .layer(build_cors_layer(config))
}
