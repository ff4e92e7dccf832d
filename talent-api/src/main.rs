//! TALENT API Server Entry Point
//!
//! Bootstraps configuration and logging, prepares the candidates table and
//! serves the Axum router until Ctrl-C.

use std::sync::Arc;

use axum::Router;
use talent_api::telemetry::{init_tracing, TelemetryConfig};
use talent_api::{
    create_api_router, ApiConfig, ApiCoordinator, ApiError, ApiResult, AppState, DbConfig,
    PgCandidateStore,
};
use talent_storage::{InMemoryCacheBackend, UpsertCoordinator};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let api_config = ApiConfig::from_env()?;
    init_tracing(&TelemetryConfig::from_api_config(&api_config))?;

    let db_config = DbConfig::from_env();
    let store = Arc::new(PgCandidateStore::from_config(&db_config)?);
    store.migrate().await?;
    tracing::info!(
        host = %db_config.host,
        dbname = %db_config.dbname,
        pool_size = store.pool_size(),
        "Candidate store ready"
    );

    let cache = Arc::new(InMemoryCacheBackend::new(&api_config.cache));
    let coordinator: ApiCoordinator = UpsertCoordinator::new(store, cache)
        .with_cache_ttl(api_config.cache.entry_ttl);

    let app: Router = create_api_router(AppState::new(Arc::new(coordinator)), &api_config);

    let addr = api_config.bind_addr()?;
    tracing::info!(%addr, environment = ?api_config.environment, "Starting TALENT API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
