//! In-memory implementation of `OutcomeIndex`.
//!
//! Maps policy ids and claim ids to the content id of the persisted
//! outcome credential, so callers can resolve "the credential for policy
//! P" without scanning the store, and the engine can detect an already
//! issued artifact on a retried call.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use verdict_contracts::{
    claim::{ClaimId, ContentId},
    error::{AdjudicationError, VerdictResult},
};
use verdict_core::traits::OutcomeIndex;

struct IndexState {
    by_policy: HashMap<u64, ContentId>,
    by_claim: HashMap<u64, ContentId>,
}

/// An in-memory outcome credential index. Clones share state.
#[derive(Clone)]
pub struct InMemoryOutcomeIndex {
    state: Arc<Mutex<IndexState>>,
}

impl InMemoryOutcomeIndex {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(IndexState {
                by_policy: HashMap::new(),
                by_claim: HashMap::new(),
            })),
        }
    }

    fn lock(&self) -> VerdictResult<std::sync::MutexGuard<'_, IndexState>> {
        self.state
            .lock()
            .map_err(|e| AdjudicationError::EvidenceUnavailable {
                reason: format!("outcome index lock poisoned: {}", e),
            })
    }
}

impl Default for InMemoryOutcomeIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl OutcomeIndex for InMemoryOutcomeIndex {
    /// Last write wins per key: a re-issued artifact replaces the entry
    /// for its claim and policy.
    fn record(&self, claim_id: ClaimId, policy_id: u64, content_id: &ContentId) -> VerdictResult<()> {
        let mut state = self.lock()?;
        state.by_claim.insert(claim_id.0, content_id.clone());
        state.by_policy.insert(policy_id, content_id.clone());
        Ok(())
    }

    fn by_policy(&self, policy_id: u64) -> VerdictResult<Option<ContentId>> {
        Ok(self.lock()?.by_policy.get(&policy_id).cloned())
    }

    fn by_claim(&self, claim_id: ClaimId) -> VerdictResult<Option<ContentId>> {
        Ok(self.lock()?.by_claim.get(&claim_id.0).cloned())
    }
}
