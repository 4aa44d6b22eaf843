//! Handler functions binding the envelopes to the engine and query
//! service.
//!
//! Field validation happens here, before the engine is touched, so a
//! request missing its key material never costs a ledger round-trip.
//! Every engine error is folded into the response envelope verbatim via
//! its `Display` form.

use tracing::warn;

use verdict_contracts::{
    claim::{Address, ClaimId},
    error::AdjudicationError,
    key::SigningKeyMaterial,
};
use verdict_core::engine::{AdjudicationEngine, DecisionRequest};
use verdict_query::ClaimQueryService;

use crate::types::{
    ApproveClaimRequest, ApproveClaimResponse, ClaimsResponse, ProviderClaimsResponse,
    RejectClaimRequest, RejectClaimResponse,
};

fn blank(field: &str, value: &str) -> Option<AdjudicationError> {
    if value.trim().is_empty() {
        Some(AdjudicationError::InvalidRequest {
            reason: format!("'{}' is required", field),
        })
    } else {
        None
    }
}

fn decision_request(
    claim_id: u64,
    insurer_did: &str,
    insurer_address: &str,
    signing_key: &str,
) -> Result<DecisionRequest, AdjudicationError> {
    for (field, value) in [
        ("insurerDid", insurer_did),
        ("insurerAddress", insurer_address),
        ("signingKey", signing_key),
    ] {
        if let Some(error) = blank(field, value) {
            return Err(error);
        }
    }
    Ok(DecisionRequest {
        claim_id: ClaimId(claim_id),
        insurer_did: insurer_did.to_string(),
        insurer_address: Address::new(insurer_address),
        signing_key: SigningKeyMaterial::from_hex(signing_key),
    })
}

/// `POST /claims/approve`
pub fn handle_approve(
    engine: &AdjudicationEngine,
    req: &ApproveClaimRequest,
) -> ApproveClaimResponse {
    let request = match decision_request(
        req.claim_id,
        &req.insurer_did,
        &req.insurer_address,
        &req.signing_key,
    ) {
        Ok(request) => request,
        Err(error) => return ApproveClaimResponse::failure(&error),
    };

    match engine.approve(&request) {
        Ok(outcome) => ApproveClaimResponse::from_outcome(outcome),
        Err(error) => {
            warn!(claim_id = req.claim_id, error = %error, "approval failed");
            ApproveClaimResponse::failure(&error)
        }
    }
}

/// `POST /claims/reject`
pub fn handle_reject(engine: &AdjudicationEngine, req: &RejectClaimRequest) -> RejectClaimResponse {
    let request = match decision_request(
        req.claim_id,
        &req.insurer_did,
        &req.insurer_address,
        &req.signing_key,
    ) {
        Ok(request) => request,
        Err(error) => return RejectClaimResponse::failure(&error),
    };

    match engine.reject(&request, &req.reason) {
        Ok(outcome) => RejectClaimResponse::from_outcome(outcome),
        Err(error) => {
            warn!(claim_id = req.claim_id, error = %error, "rejection failed");
            RejectClaimResponse::failure(&error)
        }
    }
}

/// `GET /claims`
pub fn handle_list_claims(service: &ClaimQueryService) -> ClaimsResponse {
    match service.all_claims() {
        Ok(claims) => ClaimsResponse {
            success: true,
            claims,
            error: None,
        },
        Err(error) => ClaimsResponse {
            success: false,
            claims: vec![],
            error: Some(error.to_string()),
        },
    }
}

/// `GET /claims/provider/:wallet`
pub fn handle_provider_claims(service: &ClaimQueryService, wallet: &str) -> ProviderClaimsResponse {
    if wallet.trim().is_empty() {
        return ProviderClaimsResponse {
            ok: false,
            claims: vec![],
            error: Some("'wallet' is required".to_string()),
        };
    }
    match service.claims_for_provider(&Address::new(wallet)) {
        Ok(claims) => ProviderClaimsResponse {
            ok: true,
            claims,
            error: None,
        },
        Err(error) => ProviderClaimsResponse {
            ok: false,
            claims: vec![],
            error: Some(error.to_string()),
        },
    }
}
