//! Claim identity, state machine, and ledger record types.
//!
//! A claim is the canonical adjudicable unit: submitted by a provider
//! against a policy, decided by exactly one assigned insurer, and never
//! deleted — rejected and paid claims stay permanently queryable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ledger-assigned claim identifier.
///
/// Monotonically increasing, starting at 1, never reused. The query
/// service relies on this when probing sequential identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClaimId(pub u64);

impl std::fmt::Display for ClaimId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An on-ledger actor address.
///
/// Stored with its original casing; compared case-insensitively for
/// authorization, matching how the ledger itself treats addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    /// Case-insensitive equality, the comparison used for every
    /// authorization check in the pipeline.
    pub fn matches(&self, other: &Address) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content identifier of an immutable blob in the evidence store.
///
/// Derived from the blob's bytes (SHA-256, lowercase hex), so identical
/// content always resolves to the identical id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentId(pub String);

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Confirmation reference for a committed ledger transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRef(pub String);

impl std::fmt::Display for TransactionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The claim lifecycle state machine.
///
/// States are ordinal-indexed 0–4 on the wire:
///
///   Submitted → UnderReview → {Approved, Rejected}
///   Approved  → Paid   (out-of-scope disbursement step)
///
/// `Approved` and `Rejected` may also be entered directly from
/// `Submitted`. There is no transition out of `Rejected` or `Paid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimState {
    Submitted,
    UnderReview,
    Approved,
    Rejected,
    Paid,
}

impl ClaimState {
    /// The wire ordinal for this state (0–4).
    pub fn ordinal(self) -> u8 {
        match self {
            ClaimState::Submitted => 0,
            ClaimState::UnderReview => 1,
            ClaimState::Approved => 2,
            ClaimState::Rejected => 3,
            ClaimState::Paid => 4,
        }
    }

    /// Decode a wire ordinal. `None` for anything outside 0–4.
    pub fn from_ordinal(ordinal: u8) -> Option<ClaimState> {
        match ordinal {
            0 => Some(ClaimState::Submitted),
            1 => Some(ClaimState::UnderReview),
            2 => Some(ClaimState::Approved),
            3 => Some(ClaimState::Rejected),
            4 => Some(ClaimState::Paid),
            _ => None,
        }
    }

    /// Human-readable name of this state.
    pub fn name(self) -> &'static str {
        match self {
            ClaimState::Submitted => "Submitted",
            ClaimState::UnderReview => "UnderReview",
            ClaimState::Approved => "Approved",
            ClaimState::Rejected => "Rejected",
            ClaimState::Paid => "Paid",
        }
    }

    /// Human-readable name for a raw wire ordinal.
    ///
    /// Out-of-range ordinals render as `"Unknown"` — never a panic, since
    /// raw ordinals arrive from an externally-owned ledger.
    pub fn name_of(ordinal: u8) -> &'static str {
        match ClaimState::from_ordinal(ordinal) {
            Some(state) => state.name(),
            None => "Unknown",
        }
    }

    /// True for states with no outgoing transitions at all.
    pub fn is_terminal(self) -> bool {
        matches!(self, ClaimState::Rejected | ClaimState::Paid)
    }

    /// True while an insurer decision (approve/reject) is still legal.
    pub fn accepts_decision(self) -> bool {
        matches!(self, ClaimState::Submitted | ClaimState::UnderReview)
    }

    /// The forward-only transition table.
    pub fn can_transition_to(self, next: ClaimState) -> bool {
        use ClaimState::*;
        matches!(
            (self, next),
            (Submitted, UnderReview)
                | (Submitted, Approved)
                | (Submitted, Rejected)
                | (UnderReview, Approved)
                | (UnderReview, Rejected)
                | (Approved, Paid)
        )
    }
}

impl std::fmt::Display for ClaimState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A state-changing transaction submitted to the ledger.
///
/// `Reject` carries its reason so the ledger can record it atomically
/// with the transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionKind {
    EnterReview,
    Approve,
    Reject { reason: String },
}

impl TransitionKind {
    /// The state this transition lands the claim in once confirmed.
    pub fn target_state(&self) -> ClaimState {
        match self {
            TransitionKind::EnterReview => ClaimState::UnderReview,
            TransitionKind::Approve => ClaimState::Approved,
            TransitionKind::Reject { .. } => ClaimState::Rejected,
        }
    }

    /// Short name used in transaction hashing and log output.
    pub fn name(&self) -> &'static str {
        match self {
            TransitionKind::EnterReview => "enter-review",
            TransitionKind::Approve => "approve",
            TransitionKind::Reject { .. } => "reject",
        }
    }
}

/// The canonical claim record as persisted by the ledger.
///
/// Invariants maintained by the ledger adapter:
/// - `insurer` and `amount` are immutable after creation;
/// - `state` only advances per `ClaimState::can_transition_to`;
/// - `rejection_reason` is `Some` iff `state == Rejected`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub claim_id: ClaimId,
    pub policy_id: u64,
    pub provider: Address,
    pub beneficiary: Address,
    /// The only actor authorized to transition this claim.
    pub insurer: Address,
    /// Integer amount in the smallest currency unit, carried as a decimal
    /// string end-to-end. No floating point anywhere in the pipeline.
    pub amount: String,
    /// Uploaded supporting documents, if any.
    pub evidence_ref: Option<ContentId>,
    /// A previously issued treatment credential, if any.
    pub treatment_credential_ref: Option<ContentId>,
    pub state: ClaimState,
    pub submit_date: DateTime<Utc>,
    pub rejection_reason: Option<String>,
}
