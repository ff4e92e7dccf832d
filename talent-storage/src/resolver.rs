//! Identity resolution by email.

use std::sync::Arc;

use talent_core::{CandidateProfile, TalentResult};

use crate::store::CandidateStore;

/// Resolves an email to the candidate that owns it.
///
/// Matching is exact: no trimming or case folding. If storage ever holds
/// more than one row for an email, the first one the store returns wins.
pub struct IdentityResolver<S: ?Sized> {
    store: Arc<S>,
}

impl<S: CandidateStore + ?Sized> IdentityResolver<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Find the persisted candidate for `email`, if any.
    pub async fn find_by_email(&self, email: &str) -> TalentResult<Option<CandidateProfile>> {
        let found = self.store.find_by_email(email).await?;
        tracing::debug!(email, found = found.is_some(), "Resolved candidate identity");
        Ok(found)
    }
}

impl<S: ?Sized> Clone for IdentityResolver<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}
