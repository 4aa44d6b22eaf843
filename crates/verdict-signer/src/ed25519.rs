//! The Ed25519 credential signer.
//!
//! `Ed25519CredentialSigner` implements the `CredentialSigner` trait.
//! Verification runs in two phases:
//!
//! 1. **Structural** — the raw JSON is validated against an embedded
//!    credential JSON Schema, so malformed input is rejected with a
//!    reason before any byte decoding happens.
//! 2. **Cryptographic** — the proof is detached, the remaining document
//!    is canonicalized, and the signature is checked against the proof's
//!    verification method under the credential signing domain.
//!
//! Any holder of the issuer's public key can run the same two phases
//! without consulting this system. Verification never errors: every
//! failure mode collapses to a negative `VerificationOutcome`.

use chrono::Utc;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use tracing::debug;

use verdict_contracts::{
    credential::{CredentialDocument, Proof, SignedCredential, VerificationOutcome},
    error::VerdictResult,
    key::SigningKeyMaterial,
};
use verdict_core::traits::CredentialSigner;

use crate::canonical::canonical_bytes;
use crate::key::{IssuerKey, CREDENTIAL_SIGNING_DOMAIN};

/// The proof type string attached to every signature.
pub const PROOF_TYPE: &str = "Ed25519Signature2020";

/// Structural shape every signed credential must satisfy before the
/// cryptographic check runs.
const CREDENTIAL_SCHEMA: &str = r#"{
    "type": "object",
    "required": ["@context", "type", "issuer", "issuanceDate", "credentialSubject", "proof"],
    "properties": {
        "@context": { "type": "array", "items": { "type": "string" }, "minItems": 1 },
        "type": { "type": "array", "contains": { "const": "VerifiableCredential" } },
        "issuer": {
            "type": "object",
            "required": ["id"],
            "properties": { "id": { "type": "string" } }
        },
        "issuanceDate": { "type": "string" },
        "credentialSubject": { "type": "object" },
        "proof": {
            "type": "object",
            "required": ["type", "verificationMethod", "proofValue"],
            "properties": {
                "type": { "type": "string" },
                "verificationMethod": { "type": "string" },
                "proofValue": { "type": "string" }
            }
        }
    }
}"#;

/// Signs outcome credentials with the insurer's Ed25519 key and verifies
/// arbitrary JSON as a signed credential.
pub struct Ed25519CredentialSigner;

impl Ed25519CredentialSigner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Ed25519CredentialSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialSigner for Ed25519CredentialSigner {
    fn sign(
        &self,
        document: &CredentialDocument,
        key: &SigningKeyMaterial,
    ) -> VerdictResult<SignedCredential> {
        let issuer_key = IssuerKey::from_material(key)?;
        let bytes = canonical_bytes(document)?;
        let signature = issuer_key.sign(CREDENTIAL_SIGNING_DOMAIN, &bytes);

        debug!(credential_id = %document.id.0, "credential signed");

        Ok(SignedCredential {
            document: document.clone(),
            proof: Proof {
                proof_type: PROOF_TYPE.to_string(),
                created: Utc::now(),
                verification_method: issuer_key.public_key_hex(),
                proof_value: hex::encode(signature.to_bytes()),
            },
        })
    }

    fn verify(&self, raw: &serde_json::Value) -> VerificationOutcome {
        // ── Phase 1: structural validation ───────────────────────────────────
        let schema: serde_json::Value = match serde_json::from_str(CREDENTIAL_SCHEMA) {
            Ok(schema) => schema,
            Err(e) => return VerificationOutcome::invalid(format!("internal schema error: {}", e)),
        };
        let validator = match jsonschema::validator_for(&schema) {
            Ok(validator) => validator,
            Err(e) => return VerificationOutcome::invalid(format!("internal schema error: {}", e)),
        };
        if let Some(error) = validator.iter_errors(raw).next() {
            return VerificationOutcome::invalid(format!(
                "not a well-formed signed credential: {} at {}",
                error, error.instance_path
            ));
        }

        // ── Phase 2: cryptographic check ─────────────────────────────────────
        //
        // The schema guarantees the object shape, so the extraction below
        // cannot fail structurally — only the decoding and the signature
        // itself can.
        let proof = &raw["proof"];
        let method = proof["verificationMethod"].as_str().unwrap_or_default();
        let proof_value = proof["proofValue"].as_str().unwrap_or_default();

        let key_bytes = match hex::decode(method) {
            Ok(bytes) => bytes,
            Err(_) => return VerificationOutcome::invalid("verification method is not valid hex"),
        };
        let key_bytes: [u8; 32] = match key_bytes.try_into() {
            Ok(bytes) => bytes,
            Err(_) => return VerificationOutcome::invalid("verification method is not a 32-byte key"),
        };
        let verifying_key = match VerifyingKey::from_bytes(&key_bytes) {
            Ok(key) => key,
            Err(e) => return VerificationOutcome::invalid(format!("invalid public key: {}", e)),
        };

        let signature_bytes = match hex::decode(proof_value) {
            Ok(bytes) => bytes,
            Err(_) => return VerificationOutcome::invalid("proof value is not valid hex"),
        };
        let signature = match Signature::from_slice(&signature_bytes) {
            Ok(signature) => signature,
            Err(e) => return VerificationOutcome::invalid(format!("invalid signature encoding: {}", e)),
        };

        let mut document = raw.clone();
        if let Some(object) = document.as_object_mut() {
            object.remove("proof");
        }
        let bytes = match canonical_bytes(&document) {
            Ok(bytes) => bytes,
            Err(e) => return VerificationOutcome::invalid(format!("cannot canonicalize document: {}", e)),
        };

        let mut signed_input =
            Vec::with_capacity(CREDENTIAL_SIGNING_DOMAIN.len() + bytes.len());
        signed_input.extend_from_slice(CREDENTIAL_SIGNING_DOMAIN);
        signed_input.extend_from_slice(&bytes);

        match verifying_key.verify(&signed_input, &signature) {
            Ok(()) => VerificationOutcome::valid(),
            Err(_) => VerificationOutcome::invalid("signature does not match the document"),
        }
    }
}
