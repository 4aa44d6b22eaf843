//! Ed25519 issuer key handling.
//!
//! Key material crosses the boundary as a hex-encoded 32-byte seed
//! (`SigningKeyMaterial`); this module decodes and validates it into a
//! usable keypair. Generation lives here too, for the demo and tests —
//! production keys come from the external DID subsystem.

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use rand_core::OsRng;

use verdict_contracts::{
    error::{AdjudicationError, VerdictResult},
    key::SigningKeyMaterial,
};

/// Domain separation tag for outcome credential signatures.
///
/// The signed message is `domain_tag || canonical_bytes`, so a signature
/// over a credential can never be replayed as a signature over anything
/// else this keypair signs.
pub const CREDENTIAL_SIGNING_DOMAIN: &[u8] = b"verdict:outcome-credential:v1\0";

/// A decoded Ed25519 issuer keypair.
#[derive(Clone)]
pub struct IssuerKey {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl IssuerKey {
    /// Decode boundary key material into a keypair.
    ///
    /// Fails with `Signing` on malformed hex or a seed that is not
    /// exactly 32 bytes.
    pub fn from_material(material: &SigningKeyMaterial) -> VerdictResult<Self> {
        let bytes = hex::decode(material.hex()).map_err(|e| AdjudicationError::Signing {
            reason: format!("signing key is not valid hex: {}", e),
        })?;
        let seed: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| AdjudicationError::Signing {
            reason: format!("signing key must be 32 bytes, got {}", b.len()),
        })?;
        let signing_key = SigningKey::from_bytes(&seed);
        let verifying_key = signing_key.verifying_key();
        Ok(Self {
            signing_key,
            verifying_key,
        })
    }

    /// Generate a fresh random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// The seed in boundary form, for handing to the engine.
    pub fn material(&self) -> SigningKeyMaterial {
        SigningKeyMaterial::from_hex(hex::encode(self.signing_key.to_bytes()))
    }

    /// Hex-encoded public key, used as the proof's verification method.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.verifying_key.to_bytes())
    }

    /// Sign `message` under the given domain tag.
    pub fn sign(&self, domain_tag: &[u8], message: &[u8]) -> Signature {
        let mut signing_input = Vec::with_capacity(domain_tag.len() + message.len());
        signing_input.extend_from_slice(domain_tag);
        signing_input.extend_from_slice(message);
        self.signing_key.sign(&signing_input)
    }
}
