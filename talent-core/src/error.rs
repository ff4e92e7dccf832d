//! Error types for TALENT operations

use thiserror::Error;

use crate::identity::CandidateId;

/// Durable storage errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Candidate not found: {id}")]
    NotFound { id: CandidateId },

    #[error("Unique constraint violated on {constraint}: {value}")]
    UniqueViolation { constraint: String, value: String },

    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    #[error("Query failed: {reason}")]
    Query { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Cache errors. Never fatal for an upsert.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache capacity of {capacity} entries exceeded")]
    CapacityExceeded { capacity: usize },

    #[error("Cache serialization failed for {key}: {reason}")]
    Serialization { key: String, reason: String },

    #[error("Cache unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid format for {field}: expected {expected}")]
    InvalidFormat { field: String, expected: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all TALENT errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TalentError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for TALENT operations.
pub type TalentResult<T> = Result<T, TalentError>;
