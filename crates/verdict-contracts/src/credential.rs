//! Outcome credential types.
//!
//! A settlement or rejection credential is the signed artifact produced
//! when a claim is resolved. It is constructed once by the adjudication
//! engine, signed by the insurer's key, and immutable from then on. The
//! document shape follows the W3C verifiable-credential layout so holders
//! can verify it without contacting this system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::claim::ContentId;

/// The two standard context URLs carried by every outcome credential.
pub const CREDENTIAL_CONTEXT: [&str; 2] = [
    "https://www.w3.org/2018/credentials/v1",
    "https://www.w3.org/2018/credentials/examples/v1",
];

/// Sentinel used for treatment fields when the linked treatment
/// credential is absent or could not be fetched/parsed.
pub const UNAVAILABLE: &str = "N/A";

/// Generated credential identifier, `urn:uuid:` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialId(pub String);

impl CredentialId {
    pub fn new() -> Self {
        Self(format!("urn:uuid:{}", uuid::Uuid::new_v4()))
    }
}

impl Default for CredentialId {
    fn default() -> Self {
        Self::new()
    }
}

/// The adjudication outcome recorded in the credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeStatus {
    Approved,
    Rejected,
}

impl OutcomeStatus {
    pub fn name(self) -> &'static str {
        match self {
            OutcomeStatus::Approved => "Approved",
            OutcomeStatus::Rejected => "Rejected",
        }
    }

    /// The credential type string for this outcome, appended to
    /// `"VerifiableCredential"` in the document's `type` array.
    pub fn credential_type(self) -> &'static str {
        match self {
            OutcomeStatus::Approved => "ClaimSettlementCredential",
            OutcomeStatus::Rejected => "ClaimRejectionCredential",
        }
    }
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Fields denormalized out of the linked treatment credential.
///
/// Both fields fall back to the `"N/A"` sentinel independently — a
/// treatment credential missing one field still contributes the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentSummary {
    pub treatment_description: String,
    pub bill_amount: String,
}

impl TreatmentSummary {
    /// The summary used when no treatment credential is available.
    pub fn unavailable() -> Self {
        Self {
            treatment_description: UNAVAILABLE.to_string(),
            bill_amount: UNAVAILABLE.to_string(),
        }
    }
}

/// Issuer reference inside a credential document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issuer {
    /// The insurer's DID.
    pub id: String,
}

/// The subject block of an outcome credential.
///
/// All amounts and ids are decimal strings; the beneficiary DID is the
/// subject `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeSubject {
    /// Beneficiary DID.
    pub id: String,
    pub claim_id: String,
    pub policy_id: String,
    pub provider_address: String,
    /// Claimed/settled amount in the smallest currency unit.
    pub amount: String,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub treatment_description: String,
    pub bill_amount: String,
    /// The content id the treatment summary was denormalized from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment_vc_ref: Option<ContentId>,
    pub issued_at: DateTime<Utc>,
}

/// An unsigned outcome credential document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialDocument {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub id: CredentialId,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    pub issuer: Issuer,
    #[serde(rename = "issuanceDate")]
    pub issuance_date: DateTime<Utc>,
    #[serde(rename = "credentialSubject")]
    pub credential_subject: OutcomeSubject,
}

/// The detached proof attached by the credential signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    #[serde(rename = "type")]
    pub proof_type: String,
    pub created: DateTime<Utc>,
    /// Hex-encoded Ed25519 public key of the issuer.
    pub verification_method: String,
    /// Hex-encoded signature over the canonical document bytes.
    pub proof_value: String,
}

/// A signed, immutable outcome credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedCredential {
    #[serde(flatten)]
    pub document: CredentialDocument,
    pub proof: Proof,
}

/// The result of verifying a signed credential.
///
/// `verify` never errors: malformed input produces `valid: false` with a
/// reason instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl VerificationOutcome {
    pub fn valid() -> Self {
        Self { valid: true, reason: None }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}
