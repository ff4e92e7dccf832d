//! TALENT Test Utilities
//!
//! Shared test infrastructure for the TALENT workspace:
//! - Proptest generators for candidate payloads
//! - Fixtures for common scenarios
//! - A cache backend that always fails
//! - Assertions on stored candidates

// Re-export mock storage from its source crate
pub use talent_storage::MockStorage;

// Re-export core types for convenience
pub use talent_core::{
    cache_key, CacheError, CandidateId, CandidatePayload, CandidateProfile, StorageError,
    TalentError, TalentResult,
};

pub use fixtures::sample_payload;

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use talent_storage::{CacheBackend, CacheResult, CacheStats, CacheableEntity};

// ============================================================================
// MOCK CACHE
// ============================================================================

/// Cache backend whose every write fails with `CacheError::Unavailable`.
#[derive(Debug, Default)]
pub struct FailingCache {
    attempts: AtomicU64,
}

impl FailingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls seen so far.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheBackend for FailingCache {
    async fn set<T: CacheableEntity>(
        &self,
        _key: &str,
        _value: &T,
        _expires_at: DateTime<Utc>,
    ) -> CacheResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Unavailable {
            reason: "cache offline".to_string(),
        })
    }

    async fn stats(&self) -> CacheResult<CacheStats> {
        Ok(CacheStats::default())
    }
}

// ============================================================================
// GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for candidate data.
    //!
    //! Every generated payload passes the API's field validation.

    use super::*;
    use proptest::prelude::*;

    /// Generate a well-formed email address.
    pub fn arb_email() -> impl Strategy<Value = String> {
        "[a-z]{1,8}(\\.[a-z]{1,4})?@[a-z]{2,8}\\.(com|org|io)"
    }

    /// Draw from a small pool of emails so that collisions are common.
    fn arb_email_from_pool(pool: usize) -> impl Strategy<Value = String> {
        (0..pool.max(1)).prop_map(|i| format!("candidate{}@example.com", i))
    }

    pub fn arb_name() -> impl Strategy<Value = String> {
        "[A-Z][a-z]{1,11}"
    }

    pub fn arb_phone() -> impl Strategy<Value = String> {
        prop_oneof![
            "\\+[1-9][0-9]{7,12}",
            "\\([0-9]{3}\\) [0-9]{3}-[0-9]{4}",
            "[0-9]{3}-[0-9]{4} x[0-9]{2,4}",
        ]
    }

    pub fn arb_url() -> impl Strategy<Value = String> {
        "https://(www\\.)?[a-z]{3,10}\\.com/[a-z0-9\\-]{1,12}"
    }

    pub fn arb_call_time() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("9-5".to_string()),
            Just("mornings".to_string()),
            "[0-9]{1,2}:00-[0-9]{1,2}:00",
        ]
    }

    pub fn arb_comment() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z ,.]{0,60}"
    }

    /// Generate a valid payload for the given email.
    pub fn arb_payload_for(email: String) -> impl Strategy<Value = CandidatePayload> {
        (
            arb_name(),
            arb_name(),
            proptest::option::of(arb_phone()),
            proptest::option::of(arb_call_time()),
            proptest::option::of(arb_url()),
            proptest::option::of(arb_url()),
            arb_comment(),
        )
            .prop_map(
                move |(first_name, last_name, phone_number, call_time_interval, linked_in_url, git_hub_url, comment)| {
                    CandidatePayload {
                        first_name,
                        last_name,
                        phone_number,
                        email: email.clone(),
                        call_time_interval,
                        linked_in_url,
                        git_hub_url,
                        comment,
                    }
                },
            )
    }

    /// Generate a valid payload with a random email.
    pub fn arb_payload() -> impl Strategy<Value = CandidatePayload> {
        arb_email().prop_flat_map(arb_payload_for)
    }

    /// Generate a sequence of payloads whose emails collide often.
    pub fn arb_payload_sequence(
        pool: usize,
        max_len: usize,
    ) -> impl Strategy<Value = Vec<CandidatePayload>> {
        proptest::collection::vec(
            arb_email_from_pool(pool).prop_flat_map(arb_payload_for),
            1..=max_len.max(1),
        )
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;

    /// A fully populated, valid candidate submission.
    pub fn sample_payload() -> CandidatePayload {
        CandidatePayload {
            first_name: "Alaa".to_string(),
            last_name: "Sam".to_string(),
            phone_number: Some("+1234567890".to_string()),
            email: "a@x.com".to_string(),
            call_time_interval: Some("9-5".to_string()),
            linked_in_url: Some("https://linkedin.com/in/a".to_string()),
            git_hub_url: Some("https://github.com/a".to_string()),
            comment: "hi".to_string(),
        }
    }

    /// A valid submission with only the required fields set.
    pub fn minimal_payload(email: &str) -> CandidatePayload {
        CandidatePayload {
            first_name: "Min".to_string(),
            last_name: "Imal".to_string(),
            phone_number: None,
            email: email.to_string(),
            call_time_interval: None,
            linked_in_url: None,
            git_hub_url: None,
            comment: "required fields only".to_string(),
        }
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions on stored candidates.

    use super::*;

    /// Assert that every payload field was stored as submitted.
    #[track_caller]
    pub fn assert_profile_matches(profile: &CandidateProfile, payload: &CandidatePayload) {
        assert_eq!(
            &profile.to_payload(),
            payload,
            "Stored profile {} does not match submitted payload",
            profile.id
        );
    }

    /// Assert that a TalentResult is a storage error.
    #[track_caller]
    pub fn assert_storage_error<T: std::fmt::Debug>(result: &TalentResult<T>) {
        match result {
            Err(TalentError::Storage(_)) => {}
            other => panic!("Expected Storage error, got: {:?}", other),
        }
    }

    /// Assert that a TalentResult is a unique violation on `email`.
    #[track_caller]
    pub fn assert_unique_violation<T: std::fmt::Debug>(result: &TalentResult<T>, email: &str) {
        match result {
            Err(TalentError::Storage(StorageError::UniqueViolation { value, .. })) => {
                assert_eq!(value, email, "Unique violation on the wrong value");
            }
            other => panic!("Expected UniqueViolation for {}, got: {:?}", email, other),
        }
    }
}
