//! API Configuration Module
//!
//! Server, CORS and cache settings. Configuration is loaded from environment
//! variables with sensible defaults for development.

use std::net::SocketAddr;
use std::time::Duration;

use talent_core::ConfigError;
use talent_storage::CacheConfig;

use crate::constants::{
    DEFAULT_BIND_HOST, DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CACHE_TTL_SECS, DEFAULT_CORS_MAX_AGE_SECS, DEFAULT_PORT, DEFAULT_REQUEST_TIMEOUT_SECS,
};

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue {
                field: "TALENT_ENVIRONMENT".to_string(),
                value: value.to_string(),
                reason: "expected development or production".to_string(),
            }),
        }
    }
}

/// API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    // ========================================================================
    // Server
    // ========================================================================
    pub bind_host: String,
    pub port: u16,

    /// Requests running longer than this are aborted with 408.
    pub request_timeout: Duration,

    pub environment: Environment,

    /// Emit logs as JSON lines instead of human-readable text.
    pub json_logs: bool,

    // ========================================================================
    // CORS
    // ========================================================================
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    // ========================================================================
    // Candidate cache
    // ========================================================================
    pub cache: CacheConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: DEFAULT_BIND_HOST.to_string(),
            port: DEFAULT_PORT,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            environment: Environment::Development,
            json_logs: false,
            cors_origins: Vec::new(),
            cors_max_age_secs: DEFAULT_CORS_MAX_AGE_SECS,
            cache: CacheConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `TALENT_API_BIND`: Bind host (default: 0.0.0.0)
    /// - `PORT` or `TALENT_API_PORT`: Listen port (default: 3000)
    /// - `TALENT_REQUEST_TIMEOUT_SECS`: Request timeout (default: 30)
    ///
    /// Timeout, cache TTL and cache capacity must be greater than zero.
    /// - `TALENT_ENVIRONMENT`: development or production (default: development)
    /// - `TALENT_LOG_JSON`: "true" for JSON logs (default: false)
    /// - `TALENT_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `TALENT_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `TALENT_CACHE_TTL_SECS`: Candidate cache entry lifetime (default: 600)
    /// - `TALENT_CACHE_MAX_ENTRIES`: Candidate cache capacity (default: 10000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind_host = lookup("TALENT_API_BIND").unwrap_or(defaults.bind_host);
        let port = match lookup("PORT").or_else(|| lookup("TALENT_API_PORT")) {
            Some(raw) => parse_field("TALENT_API_PORT", &raw)?,
            None => defaults.port,
        };

        let request_timeout = Duration::from_secs(non_zero(
            "TALENT_REQUEST_TIMEOUT_SECS",
            parse_or(&lookup, "TALENT_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
        )?);

        let environment = match lookup("TALENT_ENVIRONMENT") {
            Some(raw) => Environment::parse(&raw)?,
            None => defaults.environment,
        };

        let json_logs = lookup("TALENT_LOG_JSON")
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(false);

        let cors_origins = lookup("TALENT_CORS_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_max_age_secs =
            parse_or(&lookup, "TALENT_CORS_MAX_AGE_SECS", DEFAULT_CORS_MAX_AGE_SECS)?;

        let cache_ttl = non_zero(
            "TALENT_CACHE_TTL_SECS",
            parse_or(&lookup, "TALENT_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?,
        )?;
        let cache_max_entries = non_zero(
            "TALENT_CACHE_MAX_ENTRIES",
            parse_or(&lookup, "TALENT_CACHE_MAX_ENTRIES", DEFAULT_CACHE_MAX_ENTRIES)?,
        )?;
        let cache = CacheConfig::new()
            .with_ttl(Duration::from_secs(cache_ttl))
            .with_max_entries(cache_max_entries);

        Ok(Self {
            bind_host,
            port,
            request_timeout,
            environment,
            json_logs,
            cors_origins,
            cors_max_age_secs,
            cache,
        })
    }

    /// Socket address the server listens on.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                field: "TALENT_API_BIND".to_string(),
                value: addr.clone(),
                reason: e.to_string(),
            })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
        field: field.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_or<T, F>(lookup: &F, field: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(field) {
        Some(raw) => parse_field(field, &raw),
        None => Ok(default),
    }
}

fn non_zero<T>(field: &str, value: T) -> Result<T, ConfigError>
where
    T: Default + PartialEq + std::fmt::Display,
{
    if value == T::default() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}
