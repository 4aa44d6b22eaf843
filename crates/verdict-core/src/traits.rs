//! Core trait definitions for the Verdict adjudication pipeline.
//!
//! These four traits define the engine's complete external boundary:
//!
//! - `LedgerClient`     — the system of record (reads claims, commits transitions)
//! - `EvidenceStore`    — content-addressed blob storage (advisory, best-effort)
//! - `CredentialSigner` — produces and verifies signed outcome credentials
//! - `OutcomeIndex`     — side index from policy/claim ids to persisted artifacts
//!
//! The engine receives each as a trait object constructed once at startup and
//! injected — there is no process-wide client state. The ledger and evidence
//! store are external, mutually untrusted resources: the engine treats both as
//! append-only and never issues compensating writes.

use verdict_contracts::{
    claim::{Address, ClaimId, ClaimRecord, ContentId, TransactionRef, TransitionKind},
    credential::{CredentialDocument, SignedCredential, VerificationOutcome},
    error::VerdictResult,
    key::SigningKeyMaterial,
};

/// Read/write access to the claim ledger.
///
/// The ledger is the single serialization point per claim: only one decision
/// transition can be the first to apply, and every later conflicting attempt
/// must fail. Implementations block until a submitted transaction is either
/// confirmed or rejected, within a bounded timeout.
pub trait LedgerClient: Send + Sync {
    /// Fetch the current record for `id`.
    ///
    /// Returns `NotFound` for identifiers the ledger has never assigned —
    /// the query service treats that as the normal end of enumeration.
    fn get_claim(&self, id: ClaimId) -> VerdictResult<ClaimRecord>;

    /// Submit a state transition and wait for confirmation.
    ///
    /// Must fail with `Authorization` when `caller` does not match the
    /// claim's assigned insurer, and with `InvalidState` when the claim
    /// cannot legally move to the transition's target state (including the
    /// losing side of a decision race). A confirmation that times out must
    /// surface as `Indeterminate`, never as silent success or retry.
    fn submit_transition(
        &self,
        id: ClaimId,
        caller: &Address,
        kind: TransitionKind,
    ) -> VerdictResult<TransactionRef>;
}

/// Content-addressed storage for immutable blobs.
///
/// The engine never blocks a final state transition on this store: fetch
/// failures degrade to sentinel values and persist failures are reported in
/// the outcome rather than failing the call.
pub trait EvidenceStore: Send + Sync {
    /// Store `bytes` and return their content identifier.
    ///
    /// Idempotent: putting identical bytes yields the identical id.
    fn put(&self, bytes: &[u8]) -> VerdictResult<ContentId>;

    /// Fetch the blob addressed by `id`.
    ///
    /// Returns `NotFound` for unknown ids and `EvidenceUnavailable` when
    /// the store itself cannot be reached.
    fn get(&self, id: &ContentId) -> VerdictResult<Vec<u8>>;
}

/// Produces and verifies signed outcome credentials.
pub trait CredentialSigner: Send + Sync {
    /// Sign `document` with the issuer's key material.
    ///
    /// The signed form must be independently verifiable by any holder of
    /// the issuer's public key, without consulting this system.
    fn sign(
        &self,
        document: &CredentialDocument,
        key: &SigningKeyMaterial,
    ) -> VerdictResult<SignedCredential>;

    /// Verify an arbitrary JSON value as a signed credential.
    ///
    /// Must not error or panic on malformed input — a negative
    /// `VerificationOutcome` is returned instead.
    fn verify(&self, raw: &serde_json::Value) -> VerificationOutcome;
}

/// Side index over persisted outcome credentials.
///
/// Lets callers resolve "the credential for policy P" (or claim C) without
/// scanning the store, and gives the engine its idempotency check on
/// retried calls. Writes are best-effort, like the store itself.
pub trait OutcomeIndex: Send + Sync {
    /// Record that the outcome credential for (`claim_id`, `policy_id`)
    /// was persisted at `content_id`.
    fn record(
        &self,
        claim_id: ClaimId,
        policy_id: u64,
        content_id: &ContentId,
    ) -> VerdictResult<()>;

    /// Look up the persisted outcome credential for a policy.
    fn by_policy(&self, policy_id: u64) -> VerdictResult<Option<ContentId>>;

    /// Look up the persisted outcome credential for a claim.
    fn by_claim(&self, claim_id: ClaimId) -> VerdictResult<Option<ContentId>>;
}
