//! Externally-facing claim serialization.
//!
//! `ClaimView` is the shape claims take in query responses: human-readable
//! state names, an ISO timestamp alongside the raw ledger timestamp, and
//! both `state` and `status` carrying the same value (older consumers read
//! one, newer ones the other).

use serde::{Deserialize, Serialize};

use verdict_contracts::claim::{ClaimRecord, ClaimState};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimView {
    pub claim_id: String,
    pub policy_id: String,
    pub provider: String,
    pub beneficiary: String,
    pub insurer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment_vc_ref: Option<String>,
    pub amount: String,
    /// Human-readable state name.
    pub state: String,
    /// Alias of `state`.
    pub status: String,
    /// Ledger timestamp as unix seconds, stringified.
    pub submit_date: String,
    /// The same instant as ISO 8601.
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl ClaimView {
    pub fn from_record(record: &ClaimRecord) -> Self {
        // Route through the ordinal so a future raw-ordinal source shares
        // the same "Unknown" handling as the typed path.
        let state_name = ClaimState::name_of(record.state.ordinal()).to_string();
        Self {
            claim_id: record.claim_id.to_string(),
            policy_id: record.policy_id.to_string(),
            provider: record.provider.to_string(),
            beneficiary: record.beneficiary.to_string(),
            insurer: record.insurer.to_string(),
            evidence_ref: record.evidence_ref.as_ref().map(|id| id.0.clone()),
            treatment_vc_ref: record
                .treatment_credential_ref
                .as_ref()
                .map(|id| id.0.clone()),
            amount: record.amount.clone(),
            state: state_name.clone(),
            status: state_name,
            submit_date: record.submit_date.timestamp().to_string(),
            created_at: record.submit_date.to_rfc3339(),
            rejection_reason: record.rejection_reason.clone(),
        }
    }
}
