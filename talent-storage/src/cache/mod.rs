//! Write-through cache population for recently touched candidates.
//!
//! Every successful upsert leaves a copy of the committed profile in the
//! cache under `Candidate_<email>` with an absolute expiration. The cache is
//! an optimization layer: a failed cache write never fails the upsert, and
//! nothing in the upsert path reads from it.
//!
//! # Example
//!
//! ```ignore
//! let cache = InMemoryCacheBackend::new(&CacheConfig::default());
//! cache.set(&profile.cache_key(), &profile, Utc::now() + ttl).await?;
//!
//! // Inspection is a backend concern, not part of the trait.
//! let hit = cache.get::<CandidateProfile>("Candidate_a@x.com")?;
//! ```

pub mod config;
pub mod memory;
pub mod traits;

pub use config::{CacheConfig, DEFAULT_ENTRY_TTL};
pub use memory::{CachedValue, InMemoryCacheBackend};
pub use traits::{CacheBackend, CacheResult, CacheStats, CacheableEntity};
