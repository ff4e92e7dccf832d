//! Cache backend traits and cacheable entity marker.
//!
//! The upsert path only ever writes to the cache, so the backend contract is
//! a keyed `set` with an absolute expiration. Reads are a concern of the
//! concrete backend, not of this trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use talent_core::{CacheError, CandidateProfile};

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Marker trait for types that can be cached.
///
/// Implementations must be `Clone`, `Serialize`, and `DeserializeOwned` for
/// cache storage, and `Send + Sync + 'static` for async compatibility.
pub trait CacheableEntity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Key this entity is cached under.
    fn cache_key(&self) -> String;
}

/// Cache backend trait for pluggable cache implementations.
///
/// Implementations must be thread-safe. A `set` replaces the existing entry
/// under the same key unless that entry expires later than the new one.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Store `value` under `key` until `expires_at`.
    async fn set<T: CacheableEntity>(
        &self,
        key: &str,
        value: &T,
        expires_at: DateTime<Utc>,
    ) -> CacheResult<()>;

    /// Get cache statistics.
    async fn stats(&self) -> CacheResult<CacheStats>;
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of successful writes.
    pub writes: u64,
    /// Writes skipped because the key already held a later expiration.
    pub stale_writes: u64,
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses (absent or expired).
    pub misses: u64,
    /// Number of entries currently held.
    pub entry_count: u64,
    /// Number of entries dropped to make room.
    pub evictions: u64,
    /// Number of entries removed after expiring.
    pub expirations: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl CacheableEntity for CandidateProfile {
    fn cache_key(&self) -> String {
        CandidateProfile::cache_key(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use talent_core::{CandidateId, CandidatePayload};

    #[test]
    fn test_cache_stats_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.8).abs() < 0.001);

        let empty_stats = CacheStats::default();
        assert!((empty_stats.hit_rate() - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_candidate_cache_key() {
        let profile = CandidateProfile::from_payload(
            CandidateId::generate(),
            CandidatePayload {
                first_name: "A".to_string(),
                last_name: "B".to_string(),
                phone_number: None,
                email: "a@x.com".to_string(),
                call_time_interval: None,
                linked_in_url: None,
                git_hub_url: None,
                comment: "hi".to_string(),
            },
        );
        assert_eq!(CacheableEntity::cache_key(&profile), "Candidate_a@x.com");
    }
}
