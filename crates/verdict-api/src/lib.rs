//! # verdict-api
//!
//! Framework-agnostic contracts for the four adjudication operations:
//!
//! - `POST /claims/approve` → `handle_approve`
//! - `POST /claims/reject`  → `handle_reject`
//! - `GET /claims`          → `handle_list_claims`
//! - `GET /claims/provider/:wallet` → `handle_provider_claims`
//!
//! An HTTP layer binds routes to these handlers and serializes the
//! returned envelopes; this crate carries no routing or transport code.

pub mod handlers;
pub mod types;

pub use handlers::{handle_approve, handle_list_claims, handle_provider_claims, handle_reject};
pub use types::{
    ApproveClaimRequest, ApproveClaimResponse, ClaimsResponse, ProviderClaimsResponse,
    RejectClaimRequest, RejectClaimResponse,
};
