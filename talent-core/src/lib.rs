//! TALENT Core - Candidate Types
//!
//! Pure data structures shared by every other crate in the workspace.
//! Storage, caching and HTTP concerns live in `talent-storage` and
//! `talent-api`; this crate only knows what a candidate looks like and
//! how failures are categorized.

pub mod candidate;
pub mod error;
pub mod identity;

pub use candidate::{cache_key, CandidatePayload, CandidateProfile, CANDIDATE_CACHE_PREFIX};
pub use error::{
    CacheError, ConfigError, StorageError, TalentError, TalentResult, ValidationError,
};
pub use identity::{CandidateId, Timestamp};
