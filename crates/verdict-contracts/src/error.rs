//! Runtime error types for the Verdict adjudication pipeline.
//!
//! All fallible operations return `VerdictResult<T>`. Variants carry
//! enough context to produce a human-readable response envelope — callers
//! never see a bare stack trace.
//!
//! Propagation policy:
//! - `NotFound` / `Authorization` / `InvalidState` / `InvalidRequest`
//!   abort the call immediately and are surfaced verbatim, no retry.
//! - `EvidenceUnavailable` is caught inside the engine and replaced with
//!   sentinel values so a ledger-confirmed decision still completes.
//! - `UpstreamUnavailable` on the ledger aborts before any credential is
//!   built, so no artifact is ever issued for a decision that never landed.
//! - `Indeterminate` means a confirmation timed out: the transition may or
//!   may not have committed, and the caller must not blindly retry.

use thiserror::Error;

/// The unified error type for the Verdict runtime.
#[derive(Debug, Error)]
pub enum AdjudicationError {
    /// A claim, policy, or evidence blob does not exist.
    #[error("{what} '{id}' does not exist")]
    NotFound { what: String, id: String },

    /// The acting party does not match the claim's assigned insurer.
    #[error("authorization failed: {reason}")]
    Authorization { reason: String },

    /// An illegal state transition was attempted, including the losing
    /// side of a double-decision race.
    #[error("invalid claim state: {reason}")]
    InvalidState { reason: String },

    /// Caller-side validation failed before any ledger call was made.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// The ledger or signer is unreachable. Fatal to the call.
    #[error("upstream '{upstream}' unavailable: {reason}")]
    UpstreamUnavailable { upstream: String, reason: String },

    /// A ledger confirmation timed out. The transition may or may not
    /// have committed; the outcome is unknown and must not be silently
    /// retried.
    #[error("operation outcome indeterminate: {reason}")]
    Indeterminate { reason: String },

    /// The evidence store is unreachable. Degraded, never fatal: the
    /// engine substitutes sentinel values and continues.
    #[error("evidence store unavailable: {reason}")]
    EvidenceUnavailable { reason: String },

    /// Malformed or missing runtime configuration.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// Key material or signature construction failed.
    #[error("credential signing failed: {reason}")]
    Signing { reason: String },
}

impl AdjudicationError {
    /// Convenience constructor for absent entities.
    pub fn not_found(what: impl Into<String>, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            what: what.into(),
            id: id.to_string(),
        }
    }
}

/// Convenience alias used throughout the Verdict crates.
pub type VerdictResult<T> = Result<T, AdjudicationError>;
