//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use talent_core::{CandidatePayload, TalentResult};
use talent_storage::{
    CacheBackend, CandidateStore, InMemoryCacheBackend, UpsertCoordinator, UpsertOutcome,
};

use crate::db::PgCandidateStore;

/// Coordinator wiring used by the server binary.
pub type ApiCoordinator = UpsertCoordinator<PgCandidateStore, InMemoryCacheBackend>;

/// What the HTTP layer needs from the candidate core.
///
/// Object-safe so that handlers hold an `Arc<dyn CandidateService>` and do
/// not carry the store and cache type parameters around.
#[async_trait]
pub trait CandidateService: Send + Sync {
    /// Insert or overwrite the candidate keyed by `payload.email`.
    async fn upsert(&self, payload: CandidatePayload) -> TalentResult<UpsertOutcome>;

    /// Whether the backing store is reachable.
    async fn health_check(&self) -> TalentResult<bool>;
}

#[async_trait]
impl<S, C> CandidateService for UpsertCoordinator<S, C>
where
    S: CandidateStore + ?Sized + 'static,
    C: CacheBackend + 'static,
{
    async fn upsert(&self, payload: CandidatePayload) -> TalentResult<UpsertOutcome> {
        UpsertCoordinator::upsert(self, payload).await
    }

    async fn health_check(&self) -> TalentResult<bool> {
        UpsertCoordinator::health_check(self).await
    }
}

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub candidates: Arc<dyn CandidateService>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(candidates: Arc<dyn CandidateService>) -> Self {
        Self {
            candidates,
            start_time: Instant::now(),
        }
    }
}

crate::impl_from_ref!(Arc<dyn CandidateService>, candidates);
crate::impl_from_ref!(Instant, start_time);
