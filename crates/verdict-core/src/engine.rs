//! The Verdict adjudication engine: the deterministic claim decision runner.
//!
//! The engine enforces the adjudication pipeline:
//!
//!   Load → Authorize → [EnterReview] → Decide → Enrich → Build → Sign → Persist
//!
//! Two invariants shape the pipeline ordering:
//!
//! - No credential is ever built for a decision that did not land: the
//!   decision transition must be confirmed by the ledger before any artifact
//!   work starts.
//! - A confirmed decision never fails because of artifact work: evidence
//!   fetches degrade to sentinel values, and persistence failures are
//!   reported in the outcome instead of failing the call. The one exception
//!   is signing itself — an outcome credential without a proof is useless,
//!   so a signer failure is surfaced (the ledger decision still stands and a
//!   retried call re-issues the artifact without touching the ledger).

use chrono::Utc;
use tracing::{debug, info, warn};

use verdict_contracts::{
    claim::{Address, ClaimId, ClaimRecord, ClaimState, ContentId, TransactionRef, TransitionKind},
    credential::{
        CredentialDocument, CredentialId, Issuer, OutcomeStatus, OutcomeSubject, SignedCredential,
        TreatmentSummary, CREDENTIAL_CONTEXT, UNAVAILABLE,
    },
    error::{AdjudicationError, VerdictResult},
    key::SigningKeyMaterial,
};

use crate::traits::{CredentialSigner, EvidenceStore, LedgerClient, OutcomeIndex};

/// Everything the engine needs to act on behalf of an insurer.
#[derive(Debug, Clone)]
pub struct DecisionRequest {
    pub claim_id: ClaimId,
    /// The insurer's DID, used as the credential issuer.
    pub insurer_did: String,
    /// The insurer's ledger address, checked against the claim's assigned
    /// insurer before anything else happens.
    pub insurer_address: Address,
    pub signing_key: SigningKeyMaterial,
}

/// Phase-two result: whether the signed artifact made it into the
/// evidence store.
///
/// The ledger decision is final either way. Callers seeing `Failed` can
/// retry the same approve/reject call — the engine detects the already
/// decided claim and re-issues only the artifact.
#[derive(Debug, Clone)]
pub enum ArtifactPersistence {
    Stored { content_id: ContentId },
    Failed { reason: String },
}

impl ArtifactPersistence {
    pub fn content_id(&self) -> Option<&ContentId> {
        match self {
            ArtifactPersistence::Stored { content_id } => Some(content_id),
            ArtifactPersistence::Failed { .. } => None,
        }
    }

    pub fn is_stored(&self) -> bool {
        matches!(self, ArtifactPersistence::Stored { .. })
    }
}

/// What an approve/reject call returns.
///
/// `transaction_ref` is `None` only on the idempotent-replay path, where
/// the claim was already decided and no new ledger transaction was
/// submitted.
#[derive(Debug)]
pub struct AdjudicationOutcome {
    pub claim_id: ClaimId,
    pub transaction_ref: Option<TransactionRef>,
    pub credential: SignedCredential,
    pub persistence: ArtifactPersistence,
}

/// The central engine that drives claim adjudication.
///
/// Owns the four external adapters as trait objects, constructed once at
/// startup and injected. Calls on different claims may run concurrently;
/// per-claim ordering is the ledger's job, not the engine's.
pub struct AdjudicationEngine {
    ledger: Box<dyn LedgerClient>,
    evidence: Box<dyn EvidenceStore>,
    signer: Box<dyn CredentialSigner>,
    index: Box<dyn OutcomeIndex>,
}

impl AdjudicationEngine {
    pub fn new(
        ledger: Box<dyn LedgerClient>,
        evidence: Box<dyn EvidenceStore>,
        signer: Box<dyn CredentialSigner>,
        index: Box<dyn OutcomeIndex>,
    ) -> Self {
        Self {
            ledger,
            evidence,
            signer,
            index,
        }
    }

    /// Approve a claim and issue its settlement credential.
    ///
    /// # Pipeline
    ///
    /// 1. Load the claim (`NotFound` propagates).
    /// 2. Authorize: the caller must be the claim's assigned insurer
    ///    (case-insensitive address comparison) — checked before any
    ///    ledger transaction.
    /// 3. Already `Approved`? Replay: return the stored artifact, or
    ///    re-issue just the artifact if persistence failed last time. No
    ///    second ledger transition, no second credential.
    /// 4. Any other decided state → `InvalidState`.
    /// 5. If `Submitted`, submit `EnterReview` and wait for confirmation —
    ///    the first insurer decision auto-advances the skipped state.
    /// 6. Submit `Approve` and wait for confirmation. Races surface as
    ///    `InvalidState`, timeouts as `Indeterminate` — in both cases no
    ///    credential is built.
    /// 7. Fetch the linked treatment credential; every failure mode
    ///    degrades to `"N/A"` sentinels.
    /// 8. Build, sign, and best-effort persist the settlement credential.
    pub fn approve(&self, req: &DecisionRequest) -> VerdictResult<AdjudicationOutcome> {
        self.decide(req, OutcomeStatus::Approved, None)
    }

    /// Reject a claim and issue its rejection credential.
    ///
    /// Same pipeline as `approve`, with a `Reject` transition carrying
    /// `reason` and a rejection credential. A blank `reason` fails with
    /// `InvalidRequest` before any ledger call is made.
    pub fn reject(&self, req: &DecisionRequest, reason: &str) -> VerdictResult<AdjudicationOutcome> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AdjudicationError::InvalidRequest {
                reason: "a rejection requires a non-empty reason".to_string(),
            });
        }
        self.decide(req, OutcomeStatus::Rejected, Some(reason.to_string()))
    }

    // ── Pipeline ──────────────────────────────────────────────────────────────

    fn decide(
        &self,
        req: &DecisionRequest,
        status: OutcomeStatus,
        reason: Option<String>,
    ) -> VerdictResult<AdjudicationOutcome> {
        debug!(claim_id = %req.claim_id, status = %status, "adjudication starting");

        // ── Load ─────────────────────────────────────────────────────────────
        let claim = self.ledger.get_claim(req.claim_id)?;

        // ── Authorize ────────────────────────────────────────────────────────
        //
        // Checked here as well as inside the ledger: a mismatched caller
        // must not cost a ledger transaction.
        if !claim.insurer.matches(&req.insurer_address) {
            warn!(
                claim_id = %claim.claim_id,
                caller = %req.insurer_address,
                "decision attempted by non-assigned insurer"
            );
            return Err(AdjudicationError::Authorization {
                reason: format!(
                    "only the assigned insurer can decide claim {}",
                    claim.claim_id
                ),
            });
        }

        let target = match status {
            OutcomeStatus::Approved => ClaimState::Approved,
            OutcomeStatus::Rejected => ClaimState::Rejected,
        };

        // ── Replay / state check ─────────────────────────────────────────────
        if claim.state == target {
            return self.replay(req, &claim, status, reason);
        }
        if !claim.state.accepts_decision() {
            return Err(AdjudicationError::InvalidState {
                reason: format!(
                    "claim {} is already {} and cannot be {}",
                    claim.claim_id,
                    claim.state,
                    status.name().to_lowercase()
                ),
            });
        }

        // ── Auto-advance through review ──────────────────────────────────────
        //
        // The first insurer decision enters review as a side effect; there
        // is no separate manual "start review" call.
        if claim.state == ClaimState::Submitted {
            let review_tx = self.ledger.submit_transition(
                claim.claim_id,
                &req.insurer_address,
                TransitionKind::EnterReview,
            )?;
            debug!(claim_id = %claim.claim_id, tx = %review_tx, "claim entered review");
        }

        // ── Decision transition ──────────────────────────────────────────────
        //
        // The ledger is the serialization point: if a concurrent decision
        // got there first, this submission fails and no credential is built.
        let kind = match &status {
            OutcomeStatus::Approved => TransitionKind::Approve,
            OutcomeStatus::Rejected => TransitionKind::Reject {
                reason: reason.clone().unwrap_or_default(),
            },
        };
        let tx_ref = self
            .ledger
            .submit_transition(claim.claim_id, &req.insurer_address, kind)?;

        info!(
            claim_id = %claim.claim_id,
            status = %status,
            tx = %tx_ref,
            "decision committed to ledger"
        );

        // ── Artifact phase ───────────────────────────────────────────────────
        let (credential, persistence) = self.issue(&claim, req, status, reason)?;

        Ok(AdjudicationOutcome {
            claim_id: claim.claim_id,
            transaction_ref: Some(tx_ref),
            credential,
            persistence,
        })
    }

    /// Idempotent path for a claim that already carries the requested
    /// decision: return the persisted artifact if one exists, otherwise
    /// re-issue only the artifact. Never touches the ledger.
    fn replay(
        &self,
        req: &DecisionRequest,
        claim: &ClaimRecord,
        status: OutcomeStatus,
        reason: Option<String>,
    ) -> VerdictResult<AdjudicationOutcome> {
        info!(
            claim_id = %claim.claim_id,
            state = %claim.state,
            "claim already decided, replaying outcome"
        );

        match self.stored_outcome(claim.claim_id) {
            Some((content_id, credential)) => Ok(AdjudicationOutcome {
                claim_id: claim.claim_id,
                transaction_ref: None,
                credential,
                persistence: ArtifactPersistence::Stored { content_id },
            }),
            None => {
                // Persistence failed on the original call (or the artifact
                // is gone). Re-run only the artifact phase. For rejections
                // the ledger-recorded reason wins over the caller's.
                let reason = claim.rejection_reason.clone().or(reason);
                let (credential, persistence) = self.issue(claim, req, status, reason)?;
                Ok(AdjudicationOutcome {
                    claim_id: claim.claim_id,
                    transaction_ref: None,
                    credential,
                    persistence,
                })
            }
        }
    }

    /// Fetch and decode the indexed outcome credential for a claim.
    ///
    /// Every failure collapses to `None` — the caller falls back to
    /// re-issuing the artifact.
    fn stored_outcome(&self, claim_id: ClaimId) -> Option<(ContentId, SignedCredential)> {
        let content_id = match self.index.by_claim(claim_id) {
            Ok(Some(id)) => id,
            Ok(None) => return None,
            Err(e) => {
                warn!(claim_id = %claim_id, error = %e, "outcome index lookup failed");
                return None;
            }
        };
        let bytes = match self.evidence.get(&content_id) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(claim_id = %claim_id, error = %e, "stored outcome fetch failed");
                return None;
            }
        };
        match serde_json::from_slice::<SignedCredential>(&bytes) {
            Ok(credential) => Some((content_id, credential)),
            Err(e) => {
                warn!(claim_id = %claim_id, error = %e, "stored outcome is not a valid credential");
                None
            }
        }
    }

    /// The artifact phase: enrich, build, sign, best-effort persist.
    fn issue(
        &self,
        claim: &ClaimRecord,
        req: &DecisionRequest,
        status: OutcomeStatus,
        rejection_reason: Option<String>,
    ) -> VerdictResult<(SignedCredential, ArtifactPersistence)> {
        let (summary, source_ref) = self.treatment_summary(claim);
        let document = build_document(claim, req, status, rejection_reason, summary, source_ref);
        let signed = self.signer.sign(&document, &req.signing_key)?;
        let persistence = self.persist(claim, &signed);
        Ok((signed, persistence))
    }

    /// Fetch the linked treatment credential and denormalize its fields.
    ///
    /// Evidence enrichment is advisory: an absent link, unreachable store,
    /// unknown id, or unparsable document all degrade to the sentinel
    /// summary without failing adjudication.
    fn treatment_summary(&self, claim: &ClaimRecord) -> (TreatmentSummary, Option<ContentId>) {
        let Some(content_id) = claim.treatment_credential_ref.clone() else {
            debug!(claim_id = %claim.claim_id, "no treatment credential linked");
            return (TreatmentSummary::unavailable(), None);
        };

        let bytes = match self.evidence.get(&content_id) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(
                    claim_id = %claim.claim_id,
                    content_id = %content_id,
                    error = %e,
                    "treatment credential fetch failed, continuing with sentinel values"
                );
                return (TreatmentSummary::unavailable(), Some(content_id));
            }
        };

        let value: serde_json::Value = match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    claim_id = %claim.claim_id,
                    content_id = %content_id,
                    error = %e,
                    "treatment credential is not valid JSON, continuing with sentinel values"
                );
                return (TreatmentSummary::unavailable(), Some(content_id));
            }
        };

        let subject = &value["credentialSubject"];
        let summary = TreatmentSummary {
            treatment_description: field_or_sentinel(&subject["treatmentDescription"]),
            bill_amount: field_or_sentinel(&subject["billAmount"]),
        };
        (summary, Some(content_id))
    }

    /// Best-effort persistence of the signed artifact plus its index
    /// entries. The decision is already final; failure here only shows up
    /// in the outcome's `persistence` field.
    fn persist(&self, claim: &ClaimRecord, signed: &SignedCredential) -> ArtifactPersistence {
        let bytes = match serde_json::to_vec(signed) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(claim_id = %claim.claim_id, error = %e, "credential serialization failed");
                return ArtifactPersistence::Failed {
                    reason: e.to_string(),
                };
            }
        };

        match self.evidence.put(&bytes) {
            Ok(content_id) => {
                if let Err(e) = self.index.record(claim.claim_id, claim.policy_id, &content_id) {
                    warn!(
                        claim_id = %claim.claim_id,
                        content_id = %content_id,
                        error = %e,
                        "outcome index write failed"
                    );
                }
                debug!(
                    claim_id = %claim.claim_id,
                    content_id = %content_id,
                    "outcome credential persisted"
                );
                ArtifactPersistence::Stored { content_id }
            }
            Err(e) => {
                warn!(
                    claim_id = %claim.claim_id,
                    error = %e,
                    "credential persistence failed, decision stands"
                );
                ArtifactPersistence::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

// ── Document assembly ─────────────────────────────────────────────────────────

/// Derive the credential subject DID for a ledger actor.
///
/// The ledger records bare addresses; actors that registered a DID pass it
/// through unchanged.
fn subject_did(beneficiary: &Address) -> String {
    if beneficiary.0.starts_with("did:") {
        beneficiary.0.clone()
    } else {
        format!("did:example:{}", beneficiary.0)
    }
}

/// Read a treatment credential field as a string, tolerating numeric
/// encodings, with the `"N/A"` sentinel for anything else.
fn field_or_sentinel(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => UNAVAILABLE.to_string(),
    }
}

fn build_document(
    claim: &ClaimRecord,
    req: &DecisionRequest,
    status: OutcomeStatus,
    rejection_reason: Option<String>,
    summary: TreatmentSummary,
    treatment_vc_ref: Option<ContentId>,
) -> CredentialDocument {
    let now = Utc::now();
    CredentialDocument {
        context: CREDENTIAL_CONTEXT.iter().map(|s| s.to_string()).collect(),
        id: CredentialId::new(),
        types: vec![
            "VerifiableCredential".to_string(),
            status.credential_type().to_string(),
        ],
        issuer: Issuer {
            id: req.insurer_did.clone(),
        },
        issuance_date: now,
        credential_subject: OutcomeSubject {
            id: subject_did(&claim.beneficiary),
            claim_id: claim.claim_id.to_string(),
            policy_id: claim.policy_id.to_string(),
            provider_address: claim.provider.to_string(),
            amount: claim.amount.clone(),
            status,
            rejection_reason,
            treatment_description: summary.treatment_description,
            bill_amount: summary.bill_amount,
            treatment_vc_ref,
            issued_at: now,
        },
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use chrono::Utc;

    use verdict_contracts::{
        claim::{
            Address, ClaimId, ClaimRecord, ClaimState, ContentId, TransactionRef, TransitionKind,
        },
        credential::{
            CredentialDocument, OutcomeStatus, Proof, SignedCredential, VerificationOutcome,
        },
        error::{AdjudicationError, VerdictResult},
        key::SigningKeyMaterial,
    };

    use crate::traits::{CredentialSigner, EvidenceStore, LedgerClient, OutcomeIndex};

    use super::{AdjudicationEngine, ArtifactPersistence, DecisionRequest};

    // ── Mock helpers ─────────────────────────────────────────────────────────

    fn make_claim(id: u64, state: ClaimState) -> ClaimRecord {
        ClaimRecord {
            claim_id: ClaimId(id),
            policy_id: 3,
            provider: Address::new("0xP40V1D34"),
            beneficiary: Address::new("0xB3N5F1C1"),
            insurer: Address::new("0xAAA"),
            amount: "250000".to_string(),
            evidence_ref: None,
            treatment_credential_ref: None,
            state,
            submit_date: Utc::now(),
            rejection_reason: if state == ClaimState::Rejected {
                Some("not covered".to_string())
            } else {
                None
            },
        }
    }

    fn make_request(claim_id: u64) -> DecisionRequest {
        DecisionRequest {
            claim_id: ClaimId(claim_id),
            insurer_did: "did:key:ins".to_string(),
            insurer_address: Address::new("0xAAA"),
            signing_key: SigningKeyMaterial::from_hex("00".repeat(32)),
        }
    }

    /// How the mock ledger should fail decision transitions.
    #[derive(Clone, Copy, PartialEq)]
    enum LedgerFailure {
        None,
        InvalidState,
        Indeterminate,
        Unavailable,
    }

    /// A ledger that applies transitions to an in-memory claim map and
    /// records every submitted transition for later inspection.
    struct MockLedger {
        claims: Mutex<HashMap<u64, ClaimRecord>>,
        transitions: Arc<Mutex<Vec<TransitionKind>>>,
        failure: LedgerFailure,
    }

    impl MockLedger {
        fn with_claims(claims: Vec<ClaimRecord>) -> Self {
            Self {
                claims: Mutex::new(claims.into_iter().map(|c| (c.claim_id.0, c)).collect()),
                transitions: Arc::new(Mutex::new(vec![])),
                failure: LedgerFailure::None,
            }
        }

        fn failing(claims: Vec<ClaimRecord>, failure: LedgerFailure) -> Self {
            Self {
                failure,
                ..Self::with_claims(claims)
            }
        }
    }

    impl LedgerClient for MockLedger {
        fn get_claim(&self, id: ClaimId) -> VerdictResult<ClaimRecord> {
            self.claims
                .lock()
                .unwrap()
                .get(&id.0)
                .cloned()
                .ok_or_else(|| AdjudicationError::not_found("claim", id))
        }

        fn submit_transition(
            &self,
            id: ClaimId,
            _caller: &Address,
            kind: TransitionKind,
        ) -> VerdictResult<TransactionRef> {
            match self.failure {
                LedgerFailure::InvalidState if kind != TransitionKind::EnterReview => {
                    return Err(AdjudicationError::InvalidState {
                        reason: format!("claim {} was decided concurrently", id),
                    });
                }
                LedgerFailure::Indeterminate if kind != TransitionKind::EnterReview => {
                    return Err(AdjudicationError::Indeterminate {
                        reason: "confirmation timed out".to_string(),
                    });
                }
                LedgerFailure::Unavailable => {
                    return Err(AdjudicationError::UpstreamUnavailable {
                        upstream: "ledger".to_string(),
                        reason: "rpc endpoint down".to_string(),
                    });
                }
                _ => {}
            }

            let mut claims = self.claims.lock().unwrap();
            let claim = claims.get_mut(&id.0).unwrap();
            claim.state = kind.target_state();
            if let TransitionKind::Reject { reason } = &kind {
                claim.rejection_reason = Some(reason.clone());
            }
            self.transitions.lock().unwrap().push(kind);
            Ok(TransactionRef(format!("0xtx{}", id)))
        }
    }

    /// An evidence store with independently switchable get/put failures.
    struct MockEvidence {
        blobs: Mutex<HashMap<ContentId, Vec<u8>>>,
        get_unavailable: bool,
        put_unavailable: bool,
    }

    impl MockEvidence {
        fn new() -> Self {
            Self {
                blobs: Mutex::new(HashMap::new()),
                get_unavailable: false,
                put_unavailable: false,
            }
        }

        fn seed(&self, id: &str, bytes: Vec<u8>) {
            self.blobs
                .lock()
                .unwrap()
                .insert(ContentId(id.to_string()), bytes);
        }
    }

    impl EvidenceStore for MockEvidence {
        fn put(&self, bytes: &[u8]) -> VerdictResult<ContentId> {
            if self.put_unavailable {
                return Err(AdjudicationError::EvidenceUnavailable {
                    reason: "store offline".to_string(),
                });
            }
            let id = ContentId(format!("blob-{}", bytes.len()));
            self.blobs.lock().unwrap().insert(id.clone(), bytes.to_vec());
            Ok(id)
        }

        fn get(&self, id: &ContentId) -> VerdictResult<Vec<u8>> {
            if self.get_unavailable {
                return Err(AdjudicationError::EvidenceUnavailable {
                    reason: "store offline".to_string(),
                });
            }
            self.blobs
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .ok_or_else(|| AdjudicationError::not_found("evidence blob", id))
        }
    }

    /// A signer that attaches a fake proof and counts invocations.
    struct MockSigner {
        sign_count: Arc<Mutex<u32>>,
    }

    impl MockSigner {
        fn new() -> Self {
            Self {
                sign_count: Arc::new(Mutex::new(0)),
            }
        }
    }

    impl CredentialSigner for MockSigner {
        fn sign(
            &self,
            document: &CredentialDocument,
            _key: &SigningKeyMaterial,
        ) -> VerdictResult<SignedCredential> {
            *self.sign_count.lock().unwrap() += 1;
            Ok(SignedCredential {
                document: document.clone(),
                proof: Proof {
                    proof_type: "Ed25519Signature2020".to_string(),
                    created: Utc::now(),
                    verification_method: "mock-key".to_string(),
                    proof_value: "mock-signature".to_string(),
                },
            })
        }

        fn verify(&self, _raw: &serde_json::Value) -> VerificationOutcome {
            VerificationOutcome::valid()
        }
    }

    struct MockIndex {
        by_claim: Mutex<HashMap<u64, ContentId>>,
        by_policy: Mutex<HashMap<u64, ContentId>>,
    }

    impl MockIndex {
        fn new() -> Self {
            Self {
                by_claim: Mutex::new(HashMap::new()),
                by_policy: Mutex::new(HashMap::new()),
            }
        }

        fn seed_claim(&self, claim_id: u64, content_id: &str) {
            self.by_claim
                .lock()
                .unwrap()
                .insert(claim_id, ContentId(content_id.to_string()));
        }
    }

    impl OutcomeIndex for MockIndex {
        fn record(
            &self,
            claim_id: ClaimId,
            policy_id: u64,
            content_id: &ContentId,
        ) -> VerdictResult<()> {
            self.by_claim
                .lock()
                .unwrap()
                .insert(claim_id.0, content_id.clone());
            self.by_policy
                .lock()
                .unwrap()
                .insert(policy_id, content_id.clone());
            Ok(())
        }

        fn by_policy(&self, policy_id: u64) -> VerdictResult<Option<ContentId>> {
            Ok(self.by_policy.lock().unwrap().get(&policy_id).cloned())
        }

        fn by_claim(&self, claim_id: ClaimId) -> VerdictResult<Option<ContentId>> {
            Ok(self.by_claim.lock().unwrap().get(&claim_id.0).cloned())
        }
    }

    struct Harness {
        engine: AdjudicationEngine,
        transitions: Arc<Mutex<Vec<TransitionKind>>>,
        sign_count: Arc<Mutex<u32>>,
    }

    fn harness(ledger: MockLedger, evidence: MockEvidence, index: MockIndex) -> Harness {
        let transitions = ledger.transitions.clone();
        let signer = MockSigner::new();
        let sign_count = signer.sign_count.clone();
        Harness {
            engine: AdjudicationEngine::new(
                Box::new(ledger),
                Box::new(evidence),
                Box::new(signer),
                Box::new(index),
            ),
            transitions,
            sign_count,
        }
    }

    // ── Approval flow ────────────────────────────────────────────────────────

    #[test]
    fn approve_from_submitted_auto_advances_through_review() {
        let h = harness(
            MockLedger::with_claims(vec![make_claim(7, ClaimState::Submitted)]),
            MockEvidence::new(),
            MockIndex::new(),
        );

        let outcome = h.engine.approve(&make_request(7)).unwrap();

        // Two ledger transactions, in order: enter review, then approve.
        let transitions = h.transitions.lock().unwrap();
        assert_eq!(
            *transitions,
            vec![TransitionKind::EnterReview, TransitionKind::Approve]
        );

        assert!(outcome.transaction_ref.is_some());
        let subject = &outcome.credential.document.credential_subject;
        assert_eq!(subject.claim_id, "7");
        assert_eq!(subject.status, OutcomeStatus::Approved);
        assert_eq!(subject.amount, "250000");
        assert!(outcome.persistence.is_stored());
    }

    #[test]
    fn approve_from_under_review_skips_enter_review() {
        let h = harness(
            MockLedger::with_claims(vec![make_claim(7, ClaimState::UnderReview)]),
            MockEvidence::new(),
            MockIndex::new(),
        );

        h.engine.approve(&make_request(7)).unwrap();

        assert_eq!(*h.transitions.lock().unwrap(), vec![TransitionKind::Approve]);
    }

    #[test]
    fn approve_by_wrong_insurer_leaves_ledger_untouched() {
        let h = harness(
            MockLedger::with_claims(vec![make_claim(7, ClaimState::Submitted)]),
            MockEvidence::new(),
            MockIndex::new(),
        );

        let mut req = make_request(7);
        req.insurer_address = Address::new("0xBBB");
        let result = h.engine.approve(&req);

        assert!(matches!(result, Err(AdjudicationError::Authorization { .. })));
        assert!(h.transitions.lock().unwrap().is_empty());
        assert_eq!(*h.sign_count.lock().unwrap(), 0);
    }

    #[test]
    fn insurer_address_comparison_is_case_insensitive() {
        let h = harness(
            MockLedger::with_claims(vec![make_claim(7, ClaimState::Submitted)]),
            MockEvidence::new(),
            MockIndex::new(),
        );

        let mut req = make_request(7);
        req.insurer_address = Address::new("0xaaa");
        assert!(h.engine.approve(&req).is_ok());
    }

    #[test]
    fn approve_missing_claim_is_not_found() {
        let h = harness(MockLedger::with_claims(vec![]), MockEvidence::new(), MockIndex::new());

        let result = h.engine.approve(&make_request(404));
        assert!(matches!(result, Err(AdjudicationError::NotFound { .. })));
    }

    #[test]
    fn approve_rejected_claim_is_invalid_state() {
        let h = harness(
            MockLedger::with_claims(vec![make_claim(7, ClaimState::Rejected)]),
            MockEvidence::new(),
            MockIndex::new(),
        );

        let result = h.engine.approve(&make_request(7));

        match result {
            Err(AdjudicationError::InvalidState { reason }) => {
                assert!(reason.contains("Rejected"), "reason: {}", reason);
            }
            other => panic!("expected InvalidState, got {:?}", other.map(|o| o.claim_id)),
        }
        assert!(h.transitions.lock().unwrap().is_empty());
        assert_eq!(*h.sign_count.lock().unwrap(), 0);
    }

    #[test]
    fn lost_decision_race_surfaces_as_invalid_state() {
        // The claim still reads Submitted, but the ledger rejects the
        // decision transition: another decision landed first.
        let h = harness(
            MockLedger::failing(
                vec![make_claim(7, ClaimState::Submitted)],
                LedgerFailure::InvalidState,
            ),
            MockEvidence::new(),
            MockIndex::new(),
        );

        let result = h.engine.approve(&make_request(7));

        assert!(matches!(result, Err(AdjudicationError::InvalidState { .. })));
        // No credential is built for a decision that did not land.
        assert_eq!(*h.sign_count.lock().unwrap(), 0);
    }

    #[test]
    fn indeterminate_confirmation_propagates_without_credential() {
        let h = harness(
            MockLedger::failing(
                vec![make_claim(7, ClaimState::Submitted)],
                LedgerFailure::Indeterminate,
            ),
            MockEvidence::new(),
            MockIndex::new(),
        );

        let result = h.engine.approve(&make_request(7));

        assert!(matches!(result, Err(AdjudicationError::Indeterminate { .. })));
        assert_eq!(*h.sign_count.lock().unwrap(), 0);
    }

    #[test]
    fn unreachable_ledger_aborts_before_any_artifact_work() {
        let h = harness(
            MockLedger::failing(
                vec![make_claim(7, ClaimState::Submitted)],
                LedgerFailure::Unavailable,
            ),
            MockEvidence::new(),
            MockIndex::new(),
        );

        let result = h.engine.approve(&make_request(7));

        assert!(matches!(
            result,
            Err(AdjudicationError::UpstreamUnavailable { .. })
        ));
        assert_eq!(*h.sign_count.lock().unwrap(), 0);
    }

    // ── Rejection flow ───────────────────────────────────────────────────────

    #[test]
    fn reject_records_reason_in_transition_and_credential() {
        let h = harness(
            MockLedger::with_claims(vec![make_claim(7, ClaimState::Submitted)]),
            MockEvidence::new(),
            MockIndex::new(),
        );

        let outcome = h
            .engine
            .reject(&make_request(7), "service not covered by policy")
            .unwrap();

        let transitions = h.transitions.lock().unwrap();
        assert_eq!(transitions.len(), 2);
        assert_eq!(
            transitions[1],
            TransitionKind::Reject {
                reason: "service not covered by policy".to_string()
            }
        );

        let subject = &outcome.credential.document.credential_subject;
        assert_eq!(subject.status, OutcomeStatus::Rejected);
        assert_eq!(
            subject.rejection_reason.as_deref(),
            Some("service not covered by policy")
        );
    }

    #[test]
    fn reject_with_blank_reason_fails_before_any_ledger_call() {
        let h = harness(
            MockLedger::with_claims(vec![make_claim(7, ClaimState::Submitted)]),
            MockEvidence::new(),
            MockIndex::new(),
        );

        for reason in ["", "   ", "\t\n"] {
            let result = h.engine.reject(&make_request(7), reason);
            assert!(matches!(
                result,
                Err(AdjudicationError::InvalidRequest { .. })
            ));
        }
        assert!(h.transitions.lock().unwrap().is_empty());
    }

    // ── Evidence enrichment ──────────────────────────────────────────────────

    #[test]
    fn treatment_fields_are_denormalized_from_linked_credential() {
        let evidence = MockEvidence::new();
        evidence.seed(
            "treatment-cid",
            serde_json::to_vec(&serde_json::json!({
                "credentialSubject": {
                    "treatmentDescription": "Arthroscopic knee surgery",
                    "billAmount": "120000"
                }
            }))
            .unwrap(),
        );

        let mut claim = make_claim(7, ClaimState::UnderReview);
        claim.treatment_credential_ref = Some(ContentId("treatment-cid".to_string()));

        let h = harness(MockLedger::with_claims(vec![claim]), evidence, MockIndex::new());
        let outcome = h.engine.approve(&make_request(7)).unwrap();

        let subject = &outcome.credential.document.credential_subject;
        assert_eq!(subject.treatment_description, "Arthroscopic knee surgery");
        assert_eq!(subject.bill_amount, "120000");
        assert_eq!(
            subject.treatment_vc_ref,
            Some(ContentId("treatment-cid".to_string()))
        );
    }

    #[test]
    fn unreachable_evidence_store_degrades_to_sentinel_values() {
        let mut evidence = MockEvidence::new();
        evidence.get_unavailable = true;

        let mut claim = make_claim(7, ClaimState::UnderReview);
        claim.treatment_credential_ref = Some(ContentId("treatment-cid".to_string()));

        let h = harness(MockLedger::with_claims(vec![claim]), evidence, MockIndex::new());
        let outcome = h.engine.approve(&make_request(7)).unwrap();

        // The decision still succeeds; only the enrichment degrades.
        let subject = &outcome.credential.document.credential_subject;
        assert_eq!(subject.treatment_description, "N/A");
        assert_eq!(subject.bill_amount, "N/A");
    }

    #[test]
    fn unparsable_treatment_credential_degrades_to_sentinel_values() {
        let evidence = MockEvidence::new();
        evidence.seed("treatment-cid", b"not json at all".to_vec());

        let mut claim = make_claim(7, ClaimState::UnderReview);
        claim.treatment_credential_ref = Some(ContentId("treatment-cid".to_string()));

        let h = harness(MockLedger::with_claims(vec![claim]), evidence, MockIndex::new());
        let outcome = h.engine.approve(&make_request(7)).unwrap();

        let subject = &outcome.credential.document.credential_subject;
        assert_eq!(subject.treatment_description, "N/A");
        assert_eq!(subject.bill_amount, "N/A");
    }

    #[test]
    fn persistence_failure_does_not_fail_the_approval() {
        let mut evidence = MockEvidence::new();
        evidence.put_unavailable = true;

        let h = harness(
            MockLedger::with_claims(vec![make_claim(7, ClaimState::Submitted)]),
            evidence,
            MockIndex::new(),
        );

        let outcome = h.engine.approve(&make_request(7)).unwrap();

        assert!(outcome.transaction_ref.is_some());
        match &outcome.persistence {
            ArtifactPersistence::Failed { reason } => {
                assert!(reason.contains("store offline"), "reason: {}", reason);
            }
            other => panic!("expected Failed persistence, got {:?}", other),
        }
    }

    // ── Idempotent replay ────────────────────────────────────────────────────

    #[test]
    fn replay_returns_stored_artifact_without_new_ledger_transaction() {
        let evidence = MockEvidence::new();
        let index = MockIndex::new();

        // First call: decide and persist normally.
        let h = harness(
            MockLedger::with_claims(vec![make_claim(7, ClaimState::Submitted)]),
            evidence,
            index,
        );
        let first = h.engine.approve(&make_request(7)).unwrap();
        let first_id = first.credential.document.id.clone();
        assert_eq!(h.transitions.lock().unwrap().len(), 2);

        // Second call on the now-Approved claim: replay, not re-decide.
        let second = h.engine.approve(&make_request(7)).unwrap();

        assert_eq!(h.transitions.lock().unwrap().len(), 2, "no new transitions");
        assert!(second.transaction_ref.is_none());
        assert_eq!(second.credential.document.id, first_id, "same artifact");
        assert_eq!(*h.sign_count.lock().unwrap(), 1, "no second signature");
    }

    #[test]
    fn replay_without_stored_artifact_reissues_only_the_artifact() {
        // Approved on the ledger, but nothing in the index: the original
        // call's persistence failed. A retry re-issues phase two only.
        let h = harness(
            MockLedger::with_claims(vec![make_claim(7, ClaimState::Approved)]),
            MockEvidence::new(),
            MockIndex::new(),
        );

        let outcome = h.engine.approve(&make_request(7)).unwrap();

        assert!(h.transitions.lock().unwrap().is_empty());
        assert!(outcome.transaction_ref.is_none());
        assert_eq!(*h.sign_count.lock().unwrap(), 1);
        assert!(outcome.persistence.is_stored());
    }

    #[test]
    fn rejected_replay_prefers_the_ledger_recorded_reason() {
        let h = harness(
            MockLedger::with_claims(vec![make_claim(7, ClaimState::Rejected)]),
            MockEvidence::new(),
            MockIndex::new(),
        );

        let outcome = h
            .engine
            .reject(&make_request(7), "a different reason supplied on retry")
            .unwrap();

        // make_claim stores "not covered" as the ledger's rejection reason.
        assert_eq!(
            outcome
                .credential
                .document
                .credential_subject
                .rejection_reason
                .as_deref(),
            Some("not covered")
        );
    }

    #[test]
    fn replay_with_unreadable_artifact_falls_back_to_reissue() {
        let evidence = MockEvidence::new();
        evidence.seed("stale-cid", b"corrupted bytes".to_vec());
        let index = MockIndex::new();
        index.seed_claim(7, "stale-cid");

        let h = harness(
            MockLedger::with_claims(vec![make_claim(7, ClaimState::Approved)]),
            evidence,
            index,
        );

        let outcome = h.engine.approve(&make_request(7)).unwrap();

        assert_eq!(*h.sign_count.lock().unwrap(), 1, "artifact re-issued");
        assert!(outcome.persistence.is_stored());
        assert!(h.transitions.lock().unwrap().is_empty());
    }
}
