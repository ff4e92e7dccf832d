//! Candidate upsert with write-through cache population.
//!
//! One call runs four phases in order:
//!
//! 1. resolve the email to an existing row (exact match)
//! 2. stage either an insert or a full overwrite of that row
//! 3. commit the staged write as one atomic unit
//! 4. store the committed profile in the cache under `Candidate_<email>`
//!    with an absolute expiration of commit time plus the configured TTL
//!
//! The cache is never touched unless the commit succeeded. A cache failure
//! after a successful commit is logged and reported in the outcome, but
//! the upsert itself still succeeds.
//!
//! # Concurrency
//!
//! There is no lock across the resolve and commit phases. Two concurrent
//! upserts for a new email can both resolve to "absent" and both stage an
//! insert. Whatever uniqueness the store enforces decides the loser, which
//! surfaces as a storage error. Concurrent updates of one row are last
//! writer wins.
//!
//! The cache writes of two such updates are not ordered by their commits:
//! commit A, commit B, cache B, cache A is possible on a multi-threaded
//! runtime. The backend keeps whichever entry expires later, and with a
//! fixed TTL that is the one whose commit returned later. Two commits that
//! return within the same clock tick are not ordered.
//!
//! # Cancellation
//!
//! Dropping the future before the commit resolves leaves nothing behind.
//! Dropping it after the commit but before the cache write leaves the row
//! persisted without a cache entry, which is the same state a cache
//! failure produces.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use talent_core::{
    cache_key, CandidatePayload, CandidateProfile, TalentResult, Timestamp,
};

use crate::cache::{CacheBackend, DEFAULT_ENTRY_TTL};
use crate::resolver::IdentityResolver;
use crate::store::{CandidateStore, PendingWrite};

/// Which branch an upsert took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpsertAction {
    Inserted,
    Updated,
}

impl UpsertAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpsertAction::Inserted => "inserted",
            UpsertAction::Updated => "updated",
        }
    }
}

/// Result of a successful upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOutcome {
    /// The row as committed, with its surrogate id.
    pub profile: CandidateProfile,
    pub action: UpsertAction,
    /// When the commit returned.
    pub committed_at: Timestamp,
    /// Absolute expiration given to the cache entry.
    pub expires_at: Timestamp,
    /// Whether the cache write succeeded.
    pub cached: bool,
}

/// Coordinates lookup, commit and cache population for one candidate.
pub struct UpsertCoordinator<S: ?Sized, C> {
    resolver: IdentityResolver<S>,
    store: Arc<S>,
    cache: Arc<C>,
    cache_ttl: Duration,
}

impl<S: ?Sized, C> Clone for UpsertCoordinator<S, C> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
            cache_ttl: self.cache_ttl,
        }
    }
}

impl<S, C> UpsertCoordinator<S, C>
where
    S: CandidateStore + ?Sized,
    C: CacheBackend,
{
    pub fn new(store: Arc<S>, cache: Arc<C>) -> Self {
        Self {
            resolver: IdentityResolver::new(Arc::clone(&store)),
            store,
            cache,
            cache_ttl: DEFAULT_ENTRY_TTL,
        }
    }

    /// Override the cache entry lifetime.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn cache(&self) -> &Arc<C> {
        &self.cache
    }

    /// Insert or fully overwrite the candidate identified by `payload.email`.
    ///
    /// On an update every mutable field is replaced by the payload's value,
    /// including optional fields the payload leaves empty. The id never
    /// changes.
    ///
    /// # Errors
    ///
    /// Lookup and commit failures propagate unchanged and leave both storage
    /// and cache untouched. Cache failures do not produce an error.
    pub async fn upsert(&self, payload: CandidatePayload) -> TalentResult<UpsertOutcome> {
        let existing = self.resolver.find_by_email(&payload.email).await?;

        let (write, action) = match existing {
            Some(mut profile) => {
                profile.overwrite_with(payload);
                (PendingWrite::Update(profile), UpsertAction::Updated)
            }
            None => (PendingWrite::Insert(payload), UpsertAction::Inserted),
        };

        let profile = match self.store.commit(write).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(action = action.as_str(), error = %e, "Candidate commit failed");
                return Err(e);
            }
        };
        let committed_at = Utc::now();
        let expires_at = expiry_after(committed_at, self.cache_ttl);

        tracing::info!(
            candidate_id = %profile.id,
            action = action.as_str(),
            "Candidate committed"
        );

        let key = cache_key(&profile.email);
        let cached = match self.cache.set(&key, &profile, expires_at).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    cache_key = %key,
                    candidate_id = %profile.id,
                    error = %e,
                    "Failed to cache committed candidate"
                );
                false
            }
        };

        Ok(UpsertOutcome {
            profile,
            action,
            committed_at,
            expires_at,
            cached,
        })
    }

    pub async fn health_check(&self) -> TalentResult<bool> {
        self.store.health_check().await
    }
}

/// `from + ttl`, saturating at the latest representable instant.
pub fn expiry_after(from: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(ttl)
        .ok()
        .and_then(|delta| from.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
