//! PostgreSQL-backed candidate store tests.
//!
//! Require a reachable database configured through `TALENT_DB_*`.
//! Run with `--features db-tests`.

#![cfg(feature = "db-tests")]

use std::sync::Arc;

use talent_api::{DbConfig, PgCandidateStore};
use talent_core::{CandidatePayload, StorageError, TalentError};
use talent_storage::{
    CacheConfig, CandidateStore, InMemoryCacheBackend, PendingWrite, UpsertAction,
    UpsertCoordinator,
};
use talent_test_utils::{
    assertions::{assert_profile_matches, assert_unique_violation},
    fixtures, sample_payload,
};
use uuid::Uuid;

type TestResult = Result<(), Box<dyn std::error::Error>>;

async fn test_store() -> Result<Arc<PgCandidateStore>, Box<dyn std::error::Error>> {
    let store = PgCandidateStore::from_config(&DbConfig::from_env())?;
    store.migrate().await?;
    Ok(Arc::new(store))
}

fn unique_email() -> String {
    format!("pg-{}@example.com", Uuid::now_v7().simple())
}

fn payload_for(email: &str) -> CandidatePayload {
    CandidatePayload {
        email: email.to_string(),
        ..sample_payload()
    }
}

#[tokio::test]
async fn test_insert_then_update_keeps_id() -> TestResult {
    let store = test_store().await?;
    let cache = Arc::new(InMemoryCacheBackend::new(&CacheConfig::default()));
    let coordinator = UpsertCoordinator::new(Arc::clone(&store), cache);
    let email = unique_email();

    let inserted = coordinator.upsert(payload_for(&email)).await?;
    assert_eq!(inserted.action, UpsertAction::Inserted);

    let update = fixtures::minimal_payload(&email);
    let updated = coordinator.upsert(update.clone()).await?;
    assert_eq!(updated.action, UpsertAction::Updated);
    assert_eq!(updated.profile.id, inserted.profile.id);
    assert_profile_matches(&updated.profile, &update);

    let found = store
        .find_by_email(&email)
        .await?
        .ok_or("candidate missing after update")?;
    assert_eq!(found, updated.profile);
    Ok(())
}

#[tokio::test]
async fn test_second_insert_for_email_is_unique_violation() -> TestResult {
    let store = test_store().await?;
    let email = unique_email();

    store
        .commit(PendingWrite::Insert(payload_for(&email)))
        .await?;
    let second = store.commit(PendingWrite::Insert(payload_for(&email))).await;

    assert_unique_violation(&second, &email);
    if let Err(TalentError::Storage(StorageError::UniqueViolation { constraint, .. })) = second {
        assert_eq!(constraint, "candidates_email_key");
    }
    Ok(())
}

#[tokio::test]
async fn test_lookup_is_exact_match() -> TestResult {
    let store = test_store().await?;
    let email = unique_email();

    store
        .commit(PendingWrite::Insert(payload_for(&email)))
        .await?;

    assert!(store.find_by_email(&email.to_uppercase()).await?.is_none());
    assert!(store.find_by_email(&format!(" {}", email)).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_health_check_and_count() -> TestResult {
    let store = test_store().await?;
    assert!(store.health_check().await?);

    let before = store.count().await?;
    store
        .commit(PendingWrite::Insert(payload_for(&unique_email())))
        .await?;
    assert!(store.count().await? > before);
    Ok(())
}
