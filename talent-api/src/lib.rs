//! TALENT API - REST Layer for Candidate Intake
//!
//! Exposes `POST /api/candidates`, which inserts or fully overwrites the
//! candidate keyed by email, then caches the stored profile for ten minutes.
//! Candidates are persisted in PostgreSQL through `deadpool-postgres`; the
//! cache is the in-process backend from `talent-storage`.

#[macro_use]
mod macros;

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod validation;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::{ApiConfig, Environment};
pub use db::{DbConfig, PgCandidateStore};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use state::{ApiCoordinator, AppState, CandidateService};
pub use validation::validate_candidate;
