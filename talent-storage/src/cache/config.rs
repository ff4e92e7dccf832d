//! Cache configuration.

use std::time::Duration;

/// How long a freshly written candidate stays in the cache.
pub const DEFAULT_ENTRY_TTL: Duration = Duration::from_secs(10 * 60);

/// Configuration for the in-memory cache and the upsert cache policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Absolute lifetime of an entry, counted from the commit that wrote it.
    pub entry_ttl: Duration,
    /// Maximum number of entries held at once.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            entry_ttl: DEFAULT_ENTRY_TTL,
            max_entries: 10_000,
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.entry_ttl = ttl;
        self
    }

    /// Set the max entries.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttl_is_ten_minutes() {
        assert_eq!(CacheConfig::default().entry_ttl, Duration::from_secs(600));
    }

    #[test]
    fn test_cache_config_builder() {
        let config = CacheConfig::new()
            .with_ttl(Duration::from_secs(30))
            .with_max_entries(5);

        assert_eq!(config.entry_ttl, Duration::from_secs(30));
        assert_eq!(config.max_entries, 5);
    }
}
