//! Request and response envelopes for the adjudication operations.
//!
//! These are the wire shapes an HTTP layer would bind to routes; the
//! crate itself knows nothing about HTTP. Every response carries an
//! explicit success flag plus a human-readable error string on failure —
//! callers never receive a bare stack trace.

use serde::{Deserialize, Serialize};

use verdict_contracts::{
    credential::SignedCredential,
    error::AdjudicationError,
};
use verdict_core::engine::AdjudicationOutcome;
use verdict_query::ClaimView;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveClaimRequest {
    pub claim_id: u64,
    pub insurer_did: String,
    pub insurer_address: String,
    /// Hex-encoded Ed25519 seed.
    pub signing_key: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectClaimRequest {
    pub claim_id: u64,
    pub reason: String,
    pub insurer_did: String,
    pub insurer_address: String,
    pub signing_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveClaimResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(rename = "settlementVC", skip_serializing_if = "Option::is_none")]
    pub settlement_vc: Option<SignedCredential>,
    /// Content id of the persisted artifact; absent when persistence
    /// failed (the decision itself still committed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_cid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApproveClaimResponse {
    pub fn from_outcome(outcome: AdjudicationOutcome) -> Self {
        Self {
            success: true,
            claim_id: Some(outcome.claim_id.to_string()),
            tx_hash: outcome.transaction_ref.map(|tx| tx.0),
            artifact_cid: outcome.persistence.content_id().map(|id| id.0.clone()),
            settlement_vc: Some(outcome.credential),
            error: None,
        }
    }

    pub fn failure(error: &AdjudicationError) -> Self {
        Self {
            success: false,
            claim_id: None,
            tx_hash: None,
            settlement_vc: None,
            artifact_cid: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectClaimResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(rename = "rejectionVC", skip_serializing_if = "Option::is_none")]
    pub rejection_vc: Option<SignedCredential>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_cid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RejectClaimResponse {
    pub fn from_outcome(outcome: AdjudicationOutcome) -> Self {
        Self {
            success: true,
            claim_id: Some(outcome.claim_id.to_string()),
            tx_hash: outcome.transaction_ref.map(|tx| tx.0),
            artifact_cid: outcome.persistence.content_id().map(|id| id.0.clone()),
            rejection_vc: Some(outcome.credential),
            error: None,
        }
    }

    pub fn failure(error: &AdjudicationError) -> Self {
        Self {
            success: false,
            claim_id: None,
            tx_hash: None,
            rejection_vc: None,
            artifact_cid: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClaimsResponse {
    pub success: bool,
    pub claims: Vec<ClaimView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The provider-scoped listing keeps its historical `ok` flag.
#[derive(Debug, Serialize)]
pub struct ProviderClaimsResponse {
    pub ok: bool,
    pub claims: Vec<ClaimView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
