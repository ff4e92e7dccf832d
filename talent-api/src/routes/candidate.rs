//! Candidate REST API Routes
//!
//! `POST /api/candidates` inserts or fully overwrites the candidate keyed by
//! the submitted email. A malformed body or a field that fails validation is
//! answered with a bare 400. On success the submitted payload is echoed
//! back unchanged.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use talent_core::CandidatePayload;

use crate::error::ApiError;
use crate::state::{AppState, CandidateService};
use crate::telemetry::METRICS;
use crate::validation::validate_candidate;

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/candidates - Add or update a candidate
#[utoipa::path(
    post,
    path = "/api/candidates",
    tag = "Candidates",
    request_body = CandidatePayload,
    responses(
        (status = 200, description = "Candidate stored", body = CandidatePayload),
        (status = 400, description = "Malformed body or invalid field"),
        (status = 409, description = "A concurrent request registered the email first", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError),
        (status = 503, description = "Candidate storage unavailable", body = ApiError),
    ),
)]
pub async fn upsert_candidate(
    State(candidates): State<Arc<dyn CandidateService>>,
    body: Result<Json<CandidatePayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::debug!(reason = %rejection.body_text(), "Rejected candidate body");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    if let Err(e) = validate_candidate(&payload) {
        tracing::debug!(reason = %e.message, "Candidate failed validation");
        return StatusCode::BAD_REQUEST.into_response();
    }

    let echo = payload.clone();
    match candidates.upsert(payload).await {
        Ok(outcome) => {
            if let Ok(metrics) = METRICS.as_ref() {
                metrics.record_upsert(outcome.action.as_str(), outcome.cached);
            }
            (StatusCode::OK, Json(echo)).into_response()
        }
        Err(e) => {
            if let Ok(metrics) = METRICS.as_ref() {
                metrics.record_upsert("failed", false);
            }
            ApiError::from(e).into_response()
        }
    }
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the candidate routes router.
pub fn create_router() -> Router<AppState> {
    Router::new().route("/", post(upsert_candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use crate::testing::RecordingService;
    use talent_core::{StorageError, TalentError};
    use talent_test_utils::sample_payload;
    use tower::ServiceExt;

    fn app(service: Arc<RecordingService>) -> Router {
        Router::new()
            .nest("/api/candidates", create_router())
            .with_state(AppState::new(service))
    }

    fn post_json(body: String) -> Result<Request<Body>, axum::http::Error> {
        Request::builder()
            .method("POST")
            .uri("/api/candidates")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
    }

    #[tokio::test]
    async fn test_valid_submission_echoes_payload() -> Result<(), Box<dyn std::error::Error>> {
        let service = Arc::new(RecordingService::new());
        let payload = sample_payload();

        let response = app(Arc::clone(&service))
            .oneshot(post_json(serde_json::to_string(&payload)?)?)
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let echoed: CandidatePayload = serde_json::from_slice(&body)?;
        assert_eq!(echoed, payload);
        assert_eq!(service.received()?, vec![payload]);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_email_is_bare_bad_request() -> Result<(), Box<dyn std::error::Error>> {
        let service = Arc::new(RecordingService::new());
        let mut payload = sample_payload();
        payload.email = "not-an-email".to_string();

        let response = app(Arc::clone(&service))
            .oneshot(post_json(serde_json::to_string(&payload)?)?)
            .await?;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        assert!(body.is_empty());
        assert!(service.received()?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_required_field_is_bad_request() -> Result<(), Box<dyn std::error::Error>> {
        let service = Arc::new(RecordingService::new());
        let body = r#"{"firstName":"Alaa","lastName":"Sam","email":"a@x.com"}"#;

        let response = app(Arc::clone(&service))
            .oneshot(post_json(body.to_string())?)
            .await?;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(service.received()?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_url_is_bad_request() -> Result<(), Box<dyn std::error::Error>> {
        let service = Arc::new(RecordingService::new());
        let mut payload = sample_payload();
        payload.linked_in_url = Some("linkedin.com/in/a".to_string());

        let response = app(Arc::clone(&service))
            .oneshot(post_json(serde_json::to_string(&payload)?)?)
            .await?;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(service.received()?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_store_failure_is_server_error() -> Result<(), Box<dyn std::error::Error>> {
        let service = Arc::new(RecordingService::failing(TalentError::Storage(
            StorageError::TransactionFailed {
                reason: "deadlock".to_string(),
            },
        )));

        let response = app(Arc::clone(&service))
            .oneshot(post_json(serde_json::to_string(&sample_payload())?)?)
            .await?;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let err: ApiError = serde_json::from_slice(&body)?;
        assert!(!err.message.contains("deadlock"));
        Ok(())
    }
}
