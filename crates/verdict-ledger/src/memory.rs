//! In-memory implementation of `LedgerClient`.
//!
//! `InMemoryLedger` is the reference ledger: a mutex-protected claim map
//! that enforces the same rules a real contract would — monotonically
//! increasing claim ids starting at 1, insurer-only transitions, the
//! forward-only state table, and typed rejection of anything else.
//!
//! Cloning is cheap and clones share state, so the same ledger can back
//! the adjudication engine and the query service at once.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use verdict_contracts::{
    claim::{Address, ClaimId, ClaimRecord, ClaimState, ContentId, TransactionRef, TransitionKind},
    error::{AdjudicationError, VerdictResult},
};
use verdict_core::traits::LedgerClient;

/// What a provider submits to open a claim.
#[derive(Debug, Clone)]
pub struct ClaimSubmission {
    pub policy_id: u64,
    pub provider: Address,
    pub beneficiary: Address,
    pub insurer: Address,
    /// Integer amount in the smallest currency unit, as a decimal string.
    pub amount: String,
    pub evidence_ref: Option<ContentId>,
    pub treatment_credential_ref: Option<ContentId>,
}

struct LedgerState {
    claims: BTreeMap<u64, ClaimRecord>,
    next_claim_id: u64,
    /// Per-ledger transaction counter, folded into every transaction hash.
    nonce: u64,
}

/// An in-memory, append-only claim ledger.
///
/// # Thread safety
///
/// All methods acquire an internal `Mutex`. A transition observed by one
/// handle is immediately visible through every clone, which is what makes
/// the ledger the serialization point for racing decisions.
#[derive(Clone)]
pub struct InMemoryLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(LedgerState {
                claims: BTreeMap::new(),
                next_claim_id: 1,
                nonce: 0,
            })),
        }
    }

    /// Open a new claim in state `Submitted`.
    ///
    /// Assigns the next claim id (starting at 1, never reused) and stamps
    /// the submission time. Requires a positive integer amount string.
    pub fn submit_claim(&self, submission: ClaimSubmission) -> VerdictResult<ClaimId> {
        if submission.amount.is_empty() || !submission.amount.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AdjudicationError::InvalidRequest {
                reason: format!(
                    "claim amount must be a non-negative integer string, got '{}'",
                    submission.amount
                ),
            });
        }

        let mut state = self.lock()?;
        let claim_id = ClaimId(state.next_claim_id);
        state.next_claim_id += 1;

        let record = ClaimRecord {
            claim_id,
            policy_id: submission.policy_id,
            provider: submission.provider,
            beneficiary: submission.beneficiary,
            insurer: submission.insurer,
            amount: submission.amount,
            evidence_ref: submission.evidence_ref,
            treatment_credential_ref: submission.treatment_credential_ref,
            state: ClaimState::Submitted,
            submit_date: Utc::now(),
            rejection_reason: None,
        };
        state.claims.insert(claim_id.0, record);

        info!(claim_id = %claim_id, "claim submitted");
        Ok(claim_id)
    }

    /// The out-of-scope disbursement hook: advance an `Approved` claim to
    /// `Paid`. Kept on the concrete type, not the `LedgerClient` trait —
    /// adjudication never pays.
    pub fn mark_paid(&self, id: ClaimId) -> VerdictResult<TransactionRef> {
        let mut state = self.lock()?;
        let claim = state
            .claims
            .get_mut(&id.0)
            .ok_or_else(|| AdjudicationError::not_found("claim", id))?;

        if !claim.state.can_transition_to(ClaimState::Paid) {
            return Err(AdjudicationError::InvalidState {
                reason: format!("claim {} is {} and cannot be paid", id, claim.state),
            });
        }
        claim.state = ClaimState::Paid;

        let nonce = state.nonce;
        state.nonce += 1;
        Ok(transaction_ref(id, "pay", nonce))
    }

    fn lock(&self) -> VerdictResult<std::sync::MutexGuard<'_, LedgerState>> {
        self.state
            .lock()
            .map_err(|e| AdjudicationError::UpstreamUnavailable {
                upstream: "ledger".to_string(),
                reason: format!("ledger state lock poisoned: {}", e),
            })
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerClient for InMemoryLedger {
    fn get_claim(&self, id: ClaimId) -> VerdictResult<ClaimRecord> {
        self.lock()?
            .claims
            .get(&id.0)
            .cloned()
            .ok_or_else(|| AdjudicationError::not_found("claim", id))
    }

    /// Apply a transition atomically: authorization, then legality against
    /// the transition table, then the state write — all under one lock, so
    /// exactly one of two racing decisions can win.
    fn submit_transition(
        &self,
        id: ClaimId,
        caller: &Address,
        kind: TransitionKind,
    ) -> VerdictResult<TransactionRef> {
        let mut state = self.lock()?;
        let claim = state
            .claims
            .get_mut(&id.0)
            .ok_or_else(|| AdjudicationError::not_found("claim", id))?;

        if !claim.insurer.matches(caller) {
            return Err(AdjudicationError::Authorization {
                reason: format!("caller {} is not the insurer assigned to claim {}", caller, id),
            });
        }

        let target = kind.target_state();
        if !claim.state.can_transition_to(target) {
            return Err(AdjudicationError::InvalidState {
                reason: format!("claim {} cannot move from {} to {}", id, claim.state, target),
            });
        }

        if let TransitionKind::Reject { reason } = &kind {
            if reason.trim().is_empty() {
                return Err(AdjudicationError::InvalidRequest {
                    reason: "a rejection transition requires a non-empty reason".to_string(),
                });
            }
            claim.rejection_reason = Some(reason.clone());
        }
        claim.state = target;

        debug!(claim_id = %id, transition = kind.name(), state = %target, "transition confirmed");

        let nonce = state.nonce;
        state.nonce += 1;
        Ok(transaction_ref(id, kind.name(), nonce))
    }
}

/// Mint a transaction reference: `0x` + SHA-256 over (claim id, transition
/// name, ledger nonce). The nonce makes every confirmed transaction
/// distinct even for repeated transitions of the same kind.
fn transaction_ref(id: ClaimId, kind: &str, nonce: u64) -> TransactionRef {
    let mut hasher = Sha256::new();
    hasher.update(id.0.to_le_bytes());
    hasher.update(kind.as_bytes());
    hasher.update(nonce.to_le_bytes());
    TransactionRef(format!("0x{}", hex::encode(hasher.finalize())))
}
