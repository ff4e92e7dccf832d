//! In-process cache backend with absolute expiration, built on `moka`.
//!
//! Values are stored as serialized JSON so that any [`CacheableEntity`] can
//! share one cache. Each entry carries its own absolute expiration, which
//! the [`SlotExpiry`] policy hands to moka; reading an entry never extends
//! its lifetime. Capacity is bounded by `CacheConfig::max_entries` and moka
//! evicts by its own admission policy once full.
//!
//! Writes for one key never move its expiration backwards. Two upserts of
//! the same email can finish their cache writes in the opposite order of
//! their commits; the entry with the later expiration (the later commit,
//! for a fixed TTL) is the one that stays.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::notification::RemovalCause;
use moka::ops::compute::{CompResult, Op};
use moka::sync::Cache;
use moka::Expiry;
use serde::de::DeserializeOwned;
use talent_core::CacheError;

use super::config::CacheConfig;
use super::traits::{CacheBackend, CacheResult, CacheStats, CacheableEntity};

/// Upper bound on the lifetime handed to moka. Entries that saturated to
/// the far future are still filtered by their own `expires_at` on read.
const MAX_MOKA_LIFETIME: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

#[derive(Debug, Clone)]
struct CacheSlot {
    value: serde_json::Value,
    cached_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl CacheSlot {
    fn time_to_live(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now)
            .to_std()
            .unwrap_or(Duration::ZERO)
            .min(MAX_MOKA_LIFETIME)
    }
}

/// Per-entry expiration taken from the slot's absolute `expires_at`.
struct SlotExpiry;

impl Expiry<String, CacheSlot> for SlotExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheSlot,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.time_to_live(Utc::now()))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheSlot,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.time_to_live(Utc::now()))
    }
}

#[derive(Debug, Default)]
struct Counters {
    writes: AtomicU64,
    stale_writes: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

/// A value read back from the cache with its timing metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedValue<T> {
    pub value: T,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Bounded in-memory cache backend.
#[derive(Debug)]
pub struct InMemoryCacheBackend {
    entries: Cache<String, CacheSlot>,
    max_entries: usize,
    counters: Arc<Counters>,
}

impl InMemoryCacheBackend {
    /// Create a backend sized by `config.max_entries`.
    pub fn new(config: &CacheConfig) -> Self {
        let counters = Arc::new(Counters::default());
        let listener_counters = Arc::clone(&counters);

        let entries: Cache<String, CacheSlot> = Cache::builder()
            .max_capacity(config.max_entries as u64)
            .expire_after(SlotExpiry)
            .eviction_listener(move |_key, _slot, cause| match cause {
                RemovalCause::Size => {
                    listener_counters.evictions.fetch_add(1, Ordering::Relaxed);
                }
                RemovalCause::Expired => {
                    listener_counters.expirations.fetch_add(1, Ordering::Relaxed);
                }
                _ => {}
            })
            .build();

        Self {
            entries,
            max_entries: config.max_entries,
            counters,
        }
    }

    /// Read an entry as of `now`. Expired entries count as misses.
    pub fn get_at<T: DeserializeOwned>(
        &self,
        key: &str,
        now: DateTime<Utc>,
    ) -> CacheResult<Option<CachedValue<T>>> {
        let slot = match self.entries.get(key) {
            Some(slot) if slot.expires_at > now => slot,
            _ => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                return Ok(None);
            }
        };

        let value = serde_json::from_value(slot.value).map_err(|e| CacheError::Serialization {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        self.counters.hits.fetch_add(1, Ordering::Relaxed);

        Ok(Some(CachedValue {
            value,
            cached_at: slot.cached_at,
            expires_at: slot.expires_at,
        }))
    }

    /// Read an entry as of the current time.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<CachedValue<T>>> {
        self.get_at(key, Utc::now())
    }

    /// Number of live entries, after moka has applied pending evictions.
    pub fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        self.entries.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.max_entries
    }
}

#[async_trait]
impl CacheBackend for InMemoryCacheBackend {
    async fn set<T: CacheableEntity>(
        &self,
        key: &str,
        value: &T,
        expires_at: DateTime<Utc>,
    ) -> CacheResult<()> {
        if self.max_entries == 0 {
            return Err(CacheError::CapacityExceeded { capacity: 0 });
        }

        let value = serde_json::to_value(value).map_err(|e| CacheError::Serialization {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        let slot = CacheSlot {
            value,
            cached_at: Utc::now(),
            expires_at,
        };

        let result = self
            .entries
            .entry_by_ref(key)
            .and_compute_with(|existing| match existing {
                Some(entry) if entry.value().expires_at > slot.expires_at => Op::Nop,
                _ => Op::Put(slot),
            });

        if let CompResult::Unchanged(_) = result {
            self.counters.stale_writes.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(cache_key = %key, "Kept newer cache entry over a stale write");
        } else {
            self.counters.writes.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    async fn stats(&self) -> CacheResult<CacheStats> {
        let entry_count = self.len() as u64;
        let counters = &self.counters;
        Ok(CacheStats {
            writes: counters.writes.load(Ordering::Relaxed),
            stale_writes: counters.stale_writes.load(Ordering::Relaxed),
            hits: counters.hits.load(Ordering::Relaxed),
            misses: counters.misses.load(Ordering::Relaxed),
            entry_count,
            evictions: counters.evictions.load(Ordering::Relaxed),
            expirations: counters.expirations.load(Ordering::Relaxed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use talent_core::{CandidateId, CandidatePayload, CandidateProfile};

    fn profile(email: &str) -> CandidateProfile {
        CandidateProfile::from_payload(
            CandidateId::generate(),
            CandidatePayload {
                first_name: "A".to_string(),
                last_name: "B".to_string(),
                phone_number: None,
                email: email.to_string(),
                call_time_interval: None,
                linked_in_url: None,
                git_hub_url: None,
                comment: "hi".to_string(),
            },
        )
    }

    fn backend(max_entries: usize) -> InMemoryCacheBackend {
        InMemoryCacheBackend::new(&CacheConfig::new().with_max_entries(max_entries))
    }

    #[tokio::test]
    async fn test_set_then_get() -> CacheResult<()> {
        let cache = backend(10);
        let p = profile("a@x.com");
        let expires_at = Utc::now() + ChronoDuration::minutes(10);

        cache.set(&p.cache_key(), &p, expires_at).await?;

        let read = cache
            .get::<CandidateProfile>("Candidate_a@x.com")?
            .ok_or_else(|| CacheError::Unavailable { reason: "missing".into() })?;
        assert_eq!(read.value, p);
        assert_eq!(read.expires_at, expires_at);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_replaces_existing_entry() -> CacheResult<()> {
        let cache = backend(10);
        let first = profile("a@x.com");
        let mut second = first.clone();
        second.first_name = "A2".to_string();
        let expires_at = Utc::now() + ChronoDuration::minutes(10);

        cache.set(&first.cache_key(), &first, expires_at).await?;
        cache.set(&second.cache_key(), &second, expires_at).await?;

        assert_eq!(cache.len(), 1);
        let read = cache.get::<CandidateProfile>("Candidate_a@x.com")?;
        assert_eq!(read.map(|r| r.value.first_name), Some("A2".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn test_expired_entry_reads_as_absent() -> CacheResult<()> {
        let cache = backend(10);
        let p = profile("a@x.com");
        let expires_at = Utc::now() + ChronoDuration::minutes(10);
        cache.set(&p.cache_key(), &p, expires_at).await?;

        let before = cache.get_at::<CandidateProfile>(&p.cache_key(), expires_at - ChronoDuration::seconds(1))?;
        assert!(before.is_some());

        let at_expiry = cache.get_at::<CandidateProfile>(&p.cache_key(), expires_at)?;
        assert!(at_expiry.is_none());

        let stats = cache.stats().await?;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_entry_expires_at_its_absolute_deadline() -> CacheResult<()> {
        let cache = backend(10);
        let short = profile("short@x.com");
        let long = profile("long@x.com");
        let now = Utc::now();
        cache.set(&short.cache_key(), &short, now + ChronoDuration::milliseconds(50)).await?;
        cache.set(&long.cache_key(), &long, now + ChronoDuration::minutes(10)).await?;

        tokio::time::sleep(std::time::Duration::from_millis(150)).await;

        assert!(cache.get::<CandidateProfile>(&short.cache_key())?.is_none());
        assert!(cache.get::<CandidateProfile>(&long.cache_key())?.is_some());
        assert_eq!(cache.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_already_expired_write_is_not_readable() -> CacheResult<()> {
        let cache = backend(10);
        let p = profile("a@x.com");

        cache.set(&p.cache_key(), &p, Utc::now() - ChronoDuration::seconds(1)).await?;

        assert!(cache.get::<CandidateProfile>(&p.cache_key())?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_full_cache_stays_within_capacity() -> CacheResult<()> {
        let cache = backend(2);
        let expires_at = Utc::now() + ChronoDuration::minutes(10);

        for email in ["a@x.com", "b@x.com", "c@x.com", "d@x.com"] {
            let p = profile(email);
            cache.set(&p.cache_key(), &p, expires_at).await?;
        }

        assert!(cache.len() <= 2);
        assert!(cache.stats().await?.evictions >= 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_stale_write_does_not_replace_newer_entry() -> CacheResult<()> {
        let cache = backend(10);
        let now = Utc::now();
        let older = profile("a@x.com");
        let mut newer = older.clone();
        newer.comment = "second commit".to_string();

        // The later commit reaches the cache first.
        cache.set(&newer.cache_key(), &newer, now + ChronoDuration::minutes(10)).await?;
        cache
            .set(&older.cache_key(), &older, now + ChronoDuration::minutes(10) - ChronoDuration::milliseconds(5))
            .await?;

        let read = cache
            .get::<CandidateProfile>(&newer.cache_key())?
            .ok_or_else(|| CacheError::Unavailable { reason: "missing".into() })?;
        assert_eq!(read.value.comment, "second commit");
        assert_eq!(read.expires_at, now + ChronoDuration::minutes(10));

        let stats = cache.stats().await?;
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.stale_writes, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_zero_capacity_rejects_writes() {
        let cache = backend(0);
        let p = profile("a@x.com");
        let result = cache
            .set(&p.cache_key(), &p, Utc::now() + ChronoDuration::minutes(10))
            .await;
        assert_eq!(result, Err(CacheError::CapacityExceeded { capacity: 0 }));
        assert!(cache.is_empty());
    }
}
