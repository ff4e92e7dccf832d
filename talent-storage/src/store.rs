//! Async storage trait for candidate persistence.
//!
//! The trait mirrors what a relational record set offers the upsert path:
//! an exact-match lookup by email and a single atomic write that is either
//! an insert (storage assigns the id) or an update of an existing row by id.

use async_trait::async_trait;
use talent_core::{CandidatePayload, CandidateProfile, TalentResult};

/// A single staged row change, applied atomically by [`CandidateStore::commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingWrite {
    /// Insert a new row. The store assigns the surrogate id.
    Insert(CandidatePayload),
    /// Overwrite the row with `profile.id` in place.
    Update(CandidateProfile),
}

impl PendingWrite {
    /// Email the write is keyed by.
    pub fn email(&self) -> &str {
        match self {
            PendingWrite::Insert(payload) => &payload.email,
            PendingWrite::Update(profile) => &profile.email,
        }
    }
}

/// Async storage trait for candidate records.
#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// Exact-match lookup on the stored email.
    ///
    /// Returns the first match, or `None` when no row carries this email.
    /// Absence is not an error.
    async fn find_by_email(&self, email: &str) -> TalentResult<Option<CandidateProfile>>;

    /// Apply one staged write atomically and return the committed row.
    ///
    /// On error nothing is persisted.
    async fn commit(&self, write: PendingWrite) -> TalentResult<CandidateProfile>;

    /// Number of stored candidates.
    async fn count(&self) -> TalentResult<u64>;

    /// Check if the storage backend is reachable.
    async fn health_check(&self) -> TalentResult<bool>;
}
