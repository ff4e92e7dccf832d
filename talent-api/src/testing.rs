//! In-crate test doubles for route tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use talent_core::{
    CandidateId, CandidatePayload, CandidateProfile, StorageError, TalentError, TalentResult,
};
use talent_storage::{upsert::expiry_after, UpsertAction, UpsertOutcome, DEFAULT_ENTRY_TTL};

use crate::state::CandidateService;

/// `CandidateService` that records every payload it receives.
///
/// Answers with a fixed error when built with [`RecordingService::failing`],
/// otherwise reports every call as a fresh insert. A service built with
/// [`RecordingService::slow`] sleeps before answering.
pub struct RecordingService {
    received: Mutex<Vec<CandidatePayload>>,
    failure: Option<TalentError>,
    healthy: bool,
    delay: Option<Duration>,
}

impl RecordingService {
    pub fn new() -> Self {
        Self {
            received: Mutex::new(Vec::new()),
            failure: None,
            healthy: true,
            delay: None,
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    pub fn failing(err: TalentError) -> Self {
        Self {
            failure: Some(err),
            ..Self::new()
        }
    }

    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    pub fn received(&self) -> TalentResult<Vec<CandidatePayload>> {
        Ok(self
            .received
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?
            .clone())
    }
}

#[async_trait]
impl CandidateService for RecordingService {
    async fn upsert(&self, payload: CandidatePayload) -> TalentResult<UpsertOutcome> {
        self.received
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?
            .push(payload.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        let committed_at = Utc::now();
        Ok(UpsertOutcome {
            profile: CandidateProfile::from_payload(CandidateId::generate(), payload),
            action: UpsertAction::Inserted,
            committed_at,
            expires_at: expiry_after(committed_at, DEFAULT_ENTRY_TTL),
            cached: true,
        })
    }

    async fn health_check(&self) -> TalentResult<bool> {
        if self.healthy {
            Ok(true)
        } else {
            Err(StorageError::Unavailable {
                reason: "connection refused".to_string(),
            }
            .into())
        }
    }
}
