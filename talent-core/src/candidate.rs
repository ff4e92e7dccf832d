//! Candidate entity and its wire payload.
//!
//! `CandidatePayload` is what a caller submits; `CandidateProfile` is what
//! storage holds. The translation between them is an explicit field list so
//! that the "full overwrite, no merge" rule stays auditable: adding a field
//! to one type without the other fails to compile in `from_payload`,
//! `overwrite_with` and `to_payload`.

use serde::{Deserialize, Serialize};

use crate::identity::CandidateId;

/// Prefix of every candidate cache key.
pub const CANDIDATE_CACHE_PREFIX: &str = "Candidate_";

/// Build the cache key for a candidate email.
///
/// The email is used verbatim; no case folding or trimming.
pub fn cache_key(email: &str) -> String {
    format!("{}{}", CANDIDATE_CACHE_PREFIX, email)
}

/// Candidate contact data as submitted by a caller.
///
/// Carries no id: the surrogate id is owned by storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CandidatePayload {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub email: String,
    /// Preferred time window for a call, free text.
    #[serde(default)]
    pub call_time_interval: Option<String>,
    #[serde(default)]
    pub linked_in_url: Option<String>,
    #[serde(default)]
    pub git_hub_url: Option<String>,
    pub comment: String,
}

/// A persisted candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    pub id: CandidateId,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub email: String,
    pub call_time_interval: Option<String>,
    pub linked_in_url: Option<String>,
    pub git_hub_url: Option<String>,
    pub comment: String,
}

impl CandidateProfile {
    /// Build a profile from a payload and a storage-assigned id.
    pub fn from_payload(id: CandidateId, payload: CandidatePayload) -> Self {
        let CandidatePayload {
            first_name,
            last_name,
            phone_number,
            email,
            call_time_interval,
            linked_in_url,
            git_hub_url,
            comment,
        } = payload;

        Self {
            id,
            first_name,
            last_name,
            phone_number,
            email,
            call_time_interval,
            linked_in_url,
            git_hub_url,
            comment,
        }
    }

    /// Replace every field with the payload's value, keeping `id`.
    ///
    /// Optional fields absent from the payload clear the stored value.
    pub fn overwrite_with(&mut self, payload: CandidatePayload) {
        let CandidatePayload {
            first_name,
            last_name,
            phone_number,
            email,
            call_time_interval,
            linked_in_url,
            git_hub_url,
            comment,
        } = payload;

        self.first_name = first_name;
        self.last_name = last_name;
        self.phone_number = phone_number;
        self.email = email;
        self.call_time_interval = call_time_interval;
        self.linked_in_url = linked_in_url;
        self.git_hub_url = git_hub_url;
        self.comment = comment;
    }

    /// Project the profile back onto its wire shape.
    pub fn to_payload(&self) -> CandidatePayload {
        CandidatePayload {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone_number: self.phone_number.clone(),
            email: self.email.clone(),
            call_time_interval: self.call_time_interval.clone(),
            linked_in_url: self.linked_in_url.clone(),
            git_hub_url: self.git_hub_url.clone(),
            comment: self.comment.clone(),
        }
    }

    /// Cache key for this profile.
    pub fn cache_key(&self) -> String {
        cache_key(&self.email)
    }
}
