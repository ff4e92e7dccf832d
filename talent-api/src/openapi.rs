//! OpenAPI Specification for the TALENT API
//!
//! Generated by utoipa from the route annotations and the schema derives on
//! the request and response types.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::health::{ComponentHealth, HealthDetails, HealthResponse, HealthStatus};
use crate::routes::{candidate, health};
use crate::telemetry::metrics;

use talent_core::{CandidateId, CandidatePayload, CandidateProfile};

/// OpenAPI document for the TALENT API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "TALENT API",
        version = "0.1.0",
        description = "Candidate intake: insert or update a candidate by email",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        candidate::upsert_candidate,
        health::ping,
        health::liveness,
        health::readiness,
        metrics::metrics_handler,
    ),
    components(
        schemas(
            CandidatePayload,
            CandidateProfile,
            CandidateId,
            ApiError,
            ErrorCode,
            HealthResponse,
            HealthStatus,
            HealthDetails,
            ComponentHealth,
        )
    ),
    tags(
        (name = "Candidates", description = "Candidate submission keyed by email"),
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Observability", description = "Prometheus metrics"),
    )
)]
pub struct ApiDoc;
