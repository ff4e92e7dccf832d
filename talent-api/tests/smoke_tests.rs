//! End-to-end smoke tests through the full router with an in-memory store.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use std::sync::Arc;

use talent_core::{cache_key, CandidatePayload, CandidateProfile, StorageError};
use talent_storage::{MockStorage, UpsertCoordinator};
use talent_test_utils::{assertions::assert_storage_error, fixtures, sample_payload, FailingCache};
use tower::ServiceExt;

#[path = "support/coordinator.rs"]
mod test_coordinator_support;
use test_coordinator_support::{test_coordinator, test_router};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn post_candidate(payload: &CandidatePayload) -> Result<Request<Body>, Box<dyn std::error::Error>> {
    Ok(Request::builder()
        .method("POST")
        .uri("/api/candidates")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(payload)?))?)
}

#[tokio::test]
async fn test_first_submission_creates_and_caches() -> TestResult {
    let (coordinator, store, cache) = test_coordinator();
    let payload = sample_payload();

    let response = test_router(coordinator)
        .oneshot(post_candidate(&payload)?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    let echoed: CandidatePayload = serde_json::from_slice(&body)?;
    assert_eq!(echoed, payload);

    let rows = store.snapshot()?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].to_payload(), payload);

    let cached = cache
        .get::<CandidateProfile>(&cache_key("a@x.com"))?
        .ok_or("candidate was not cached")?;
    assert_eq!(cached.value, rows[0]);
    Ok(())
}

#[tokio::test]
async fn test_resubmission_overwrites_and_clears_optionals() -> TestResult {
    let (coordinator, store, cache) = test_coordinator();
    let router = test_router(coordinator);

    router.clone().oneshot(post_candidate(&sample_payload())?).await?;
    let original_id = store.snapshot()?[0].id;

    let mut update = fixtures::minimal_payload("a@x.com");
    update.first_name = "Ala".to_string();
    let response = router.oneshot(post_candidate(&update)?).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let rows = store.snapshot()?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, original_id);
    assert_eq!(rows[0].first_name, "Ala");
    assert_eq!(rows[0].phone_number, None);
    assert_eq!(rows[0].linked_in_url, None);
    assert_eq!(rows[0].git_hub_url, None);

    let cached = cache
        .get::<CandidateProfile>(&cache_key("a@x.com"))?
        .ok_or("candidate was not cached")?;
    assert_eq!(cached.value, rows[0]);
    Ok(())
}

#[tokio::test]
async fn test_distinct_emails_create_distinct_rows() -> TestResult {
    let (coordinator, store, _cache) = test_coordinator();
    let router = test_router(coordinator);

    router
        .clone()
        .oneshot(post_candidate(&fixtures::minimal_payload("a@x.com"))?)
        .await?;
    router
        .oneshot(post_candidate(&fixtures::minimal_payload("A@x.com"))?)
        .await?;

    assert_eq!(store.candidate_count()?, 2);
    Ok(())
}

#[tokio::test]
async fn test_invalid_submission_touches_nothing() -> TestResult {
    let (coordinator, store, cache) = test_coordinator();
    let mut payload = sample_payload();
    payload.first_name = "   ".to_string();

    let response = test_router(coordinator)
        .oneshot(post_candidate(&payload)?)
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.commit_count(), 0);
    assert!(cache.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_commit_failure_leaves_cache_empty() -> TestResult {
    let (coordinator, store, cache) = test_coordinator();
    store.fail_next_commit(StorageError::TransactionFailed {
        reason: "serialization failure".to_string(),
    })?;

    let response = test_router(coordinator)
        .oneshot(post_candidate(&sample_payload())?)
        .await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(store.candidate_count()?, 0);
    assert!(cache.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_commit_failure_surfaces_as_storage_error() -> TestResult {
    let (coordinator, store, cache) = test_coordinator();
    store.fail_next_commit(StorageError::TransactionFailed {
        reason: "deadlock detected".to_string(),
    })?;

    let result = coordinator.upsert(sample_payload()).await;

    assert_storage_error(&result);
    assert!(cache.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_cache_outage_still_answers_ok() -> TestResult {
    let store = Arc::new(MockStorage::new());
    let cache = Arc::new(FailingCache::new());
    let coordinator = UpsertCoordinator::new(Arc::clone(&store), Arc::clone(&cache));

    let response = test_router(coordinator)
        .oneshot(post_candidate(&sample_payload())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(cache.attempts(), 1);
    assert_eq!(store.candidate_count()?, 1);
    Ok(())
}

#[tokio::test]
async fn test_cache_outage_is_reported_in_outcome() -> TestResult {
    let store = Arc::new(MockStorage::new());
    let cache = Arc::new(FailingCache::new());
    let coordinator = UpsertCoordinator::new(Arc::clone(&store), Arc::clone(&cache));

    let first = coordinator.upsert(sample_payload()).await?;
    let second = coordinator.upsert(fixtures::minimal_payload("a@x.com")).await?;

    assert!(!first.cached);
    assert!(!second.cached);
    assert_eq!(second.profile.id, first.profile.id);
    assert_eq!(cache.attempts(), 2);
    Ok(())
}

#[tokio::test]
async fn test_store_unavailable_is_service_unavailable() -> TestResult {
    let (coordinator, store, _cache) = test_coordinator();
    store.fail_next_lookup(StorageError::Unavailable {
        reason: "pool exhausted".to_string(),
    })?;

    let response = test_router(coordinator)
        .oneshot(post_candidate(&sample_payload())?)
        .await?;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}

#[tokio::test]
async fn test_readiness_reports_healthy_store() -> TestResult {
    let (coordinator, _store, _cache) = test_coordinator();

    let response = test_router(coordinator)
        .oneshot(Request::builder().uri("/health/ready").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_metrics_endpoint_serves_text() -> TestResult {
    let (coordinator, _store, _cache) = test_coordinator();
    let router = test_router(coordinator);

    router.clone().oneshot(post_candidate(&sample_payload())?).await?;
    let response = router
        .oneshot(Request::builder().uri("/metrics").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    let text = String::from_utf8(body.to_vec())?;
    assert!(text.contains("talent_candidate_upserts_total"));
    Ok(())
}
