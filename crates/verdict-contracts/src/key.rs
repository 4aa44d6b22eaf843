//! Issuer key material as it crosses the system boundary.
//!
//! Key generation and resolution belong to the external DID subsystem;
//! this type only carries what the signer needs: a hex-encoded 32-byte
//! Ed25519 seed. Decoding and validation happen inside the signer, so a
//! malformed seed fails at signing time with a typed error.

/// Hex-encoded Ed25519 seed for the insurer's signing key.
///
/// Deliberately opaque: no `Serialize`, and `Debug` redacts the contents
/// so key material cannot leak through logs or error output.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKeyMaterial(String);

impl SigningKeyMaterial {
    pub fn from_hex(hex_seed: impl Into<String>) -> Self {
        Self(hex_seed.into())
    }

    /// The raw hex string, consumed by the signer.
    pub fn hex(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SigningKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKeyMaterial(redacted)")
    }
}
