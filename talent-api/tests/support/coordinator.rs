use std::sync::Arc;
use std::time::Duration;

use talent_api::{create_api_router, ApiConfig, AppState};
use talent_storage::{
    CacheBackend, CacheConfig, CandidateStore, InMemoryCacheBackend, MockStorage, UpsertCoordinator,
};

pub type TestCoordinator = UpsertCoordinator<MockStorage, InMemoryCacheBackend>;

/// Coordinator over an in-memory store and cache with the default TTL.
pub fn test_coordinator() -> (TestCoordinator, Arc<MockStorage>, Arc<InMemoryCacheBackend>) {
    let store = Arc::new(MockStorage::new());
    let cache = Arc::new(InMemoryCacheBackend::new(&CacheConfig::default()));
    let coordinator = UpsertCoordinator::new(Arc::clone(&store), Arc::clone(&cache));
    (coordinator, store, cache)
}

/// Full API router backed by `coordinator`, with a generous request timeout.
pub fn test_router<S, C>(coordinator: UpsertCoordinator<S, C>) -> axum::Router
where
    S: CandidateStore + 'static,
    C: CacheBackend + 'static,
{
    let config = ApiConfig {
        request_timeout: Duration::from_secs(10),
        ..ApiConfig::default()
    };
    create_api_router(AppState::new(Arc::new(coordinator)), &config)
}
