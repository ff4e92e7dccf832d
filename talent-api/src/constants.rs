//! Constants for TALENT API

// ============================================================================
// SERVER
// ============================================================================

pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 3000;

/// Default request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// CORS
// ============================================================================

/// Default CORS max age in seconds (24 hours)
pub const DEFAULT_CORS_MAX_AGE_SECS: u64 = 86400;

// ============================================================================
// CANDIDATE CACHE
// ============================================================================

/// Cache entry lifetime after a commit (10 minutes)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;

pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 10_000;

// ============================================================================
// DATABASE
// ============================================================================

pub const DEFAULT_DB_POOL_SIZE: usize = 16;

pub const DEFAULT_DB_TIMEOUT_SECS: u64 = 30;
