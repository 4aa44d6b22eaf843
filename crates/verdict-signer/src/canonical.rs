//! Canonical JSON bytes for signing and verification.
//!
//! Both sides of a signature must agree on the exact byte sequence.
//! Routing every value through `serde_json::Value` before serializing
//! makes the byte form independent of struct field declaration order:
//! `Value` objects are backed by a `BTreeMap`, so keys always serialize
//! sorted, with no pretty-printing and no trailing whitespace.

use serde::Serialize;

use verdict_contracts::error::{AdjudicationError, VerdictResult};

/// Serialize `value` to its canonical byte form.
pub fn canonical_bytes<T: Serialize>(value: &T) -> VerdictResult<Vec<u8>> {
    let value = serde_json::to_value(value).map_err(|e| AdjudicationError::Signing {
        reason: format!("credential cannot be canonicalized: {}", e),
    })?;
    serde_json::to_vec(&value).map_err(|e| AdjudicationError::Signing {
        reason: format!("credential cannot be serialized: {}", e),
    })
}
