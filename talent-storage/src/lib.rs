//! TALENT Storage - Storage Traits, Cache and Upsert Coordination
//!
//! Defines the storage and cache abstractions used by the candidate upsert
//! path, an in-memory store for tests and local runs, and the coordinator
//! that ties them together. The PostgreSQL store lives in talent-api.

pub mod cache;
pub mod resolver;
pub mod store;
pub mod upsert;

pub use cache::{
    CacheBackend, CacheConfig, CacheResult, CacheStats, CacheableEntity, CachedValue,
    InMemoryCacheBackend, DEFAULT_ENTRY_TTL,
};
pub use resolver::IdentityResolver;
pub use store::{CandidateStore, PendingWrite};
pub use upsert::{UpsertAction, UpsertCoordinator, UpsertOutcome};

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};
use talent_core::{CandidateId, CandidateProfile, StorageError, TalentResult};

// ============================================================================
// MOCK STORAGE
// ============================================================================

/// In-memory candidate store.
///
/// Rows are kept in insertion order, so "first match" is the oldest row.
/// Email uniqueness is enforced on commit the way a unique index would.
/// Failures can be queued up front to exercise error paths.
#[derive(Debug, Default)]
pub struct MockStorage {
    candidates: RwLock<Vec<CandidateProfile>>,
    lookup_failures: Mutex<VecDeque<StorageError>>,
    commit_failures: Mutex<VecDeque<StorageError>>,
    commits: AtomicU64,
}

impl MockStorage {
    /// Create a new mock storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get count of stored candidates.
    pub fn candidate_count(&self) -> TalentResult<usize> {
        Ok(self.read()?.len())
    }

    /// Count rows carrying exactly this email.
    pub fn count_by_email(&self, email: &str) -> TalentResult<usize> {
        Ok(self.read()?.iter().filter(|c| c.email == email).count())
    }

    /// Get a candidate by id.
    pub fn get(&self, id: CandidateId) -> TalentResult<Option<CandidateProfile>> {
        Ok(self.read()?.iter().find(|c| c.id == id).cloned())
    }

    /// All stored rows in insertion order.
    pub fn snapshot(&self) -> TalentResult<Vec<CandidateProfile>> {
        Ok(self.read()?.clone())
    }

    /// Number of successful commits so far.
    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::SeqCst)
    }

    /// Store a row as-is, skipping the email uniqueness check.
    ///
    /// Only meant for seeding corrupted data in tests.
    pub fn insert_unchecked(&self, profile: CandidateProfile) -> TalentResult<()> {
        self.write()?.push(profile);
        Ok(())
    }

    /// Make the next `find_by_email` call fail with `err`.
    pub fn fail_next_lookup(&self, err: StorageError) -> TalentResult<()> {
        self.lookup_failures
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?
            .push_back(err);
        Ok(())
    }

    /// Make the next `commit` call fail with `err` without touching state.
    pub fn fail_next_commit(&self, err: StorageError) -> TalentResult<()> {
        self.commit_failures
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?
            .push_back(err);
        Ok(())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<CandidateProfile>>, StorageError> {
        self.candidates.read().map_err(|_| StorageError::LockPoisoned)
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<CandidateProfile>>, StorageError> {
        self.candidates.write().map_err(|_| StorageError::LockPoisoned)
    }

    fn take_failure(queue: &Mutex<VecDeque<StorageError>>) -> Result<(), StorageError> {
        let next = queue
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?
            .pop_front();
        match next {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn email_taken(constraint_value: &str) -> StorageError {
    StorageError::UniqueViolation {
        constraint: "candidates_email_key".to_string(),
        value: constraint_value.to_string(),
    }
}

#[async_trait]
impl CandidateStore for MockStorage {
    async fn find_by_email(&self, email: &str) -> TalentResult<Option<CandidateProfile>> {
        Self::take_failure(&self.lookup_failures)?;
        Ok(self.read()?.iter().find(|c| c.email == email).cloned())
    }

    async fn commit(&self, write: PendingWrite) -> TalentResult<CandidateProfile> {
        Self::take_failure(&self.commit_failures)?;
        let mut candidates = self.write()?;

        let committed = match write {
            PendingWrite::Insert(payload) => {
                if candidates.iter().any(|c| c.email == payload.email) {
                    return Err(email_taken(&payload.email).into());
                }
                let profile = CandidateProfile::from_payload(CandidateId::generate(), payload);
                candidates.push(profile.clone());
                profile
            }
            PendingWrite::Update(profile) => {
                if candidates
                    .iter()
                    .any(|c| c.email == profile.email && c.id != profile.id)
                {
                    return Err(email_taken(&profile.email).into());
                }
                let row = candidates
                    .iter_mut()
                    .find(|c| c.id == profile.id)
                    .ok_or(StorageError::NotFound { id: profile.id })?;
                *row = profile.clone();
                profile
            }
        };

        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(committed)
    }

    async fn count(&self) -> TalentResult<u64> {
        Ok(self.read()?.len() as u64)
    }

    async fn health_check(&self) -> TalentResult<bool> {
        Ok(self.candidates.read().is_ok())
    }
}
