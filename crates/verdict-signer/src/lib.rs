//! # verdict-signer
//!
//! Credential signing and verification for the Verdict runtime.
//!
//! Outcome credentials are signed with the insurer's Ed25519 key over a
//! canonical JSON form, under a domain-separation tag, producing a
//! detached proof object. The signed artifact is self-contained: any
//! holder of the issuer's public key can verify it offline.

pub mod canonical;
pub mod ed25519;
pub mod key;

pub use canonical::canonical_bytes;
pub use ed25519::Ed25519CredentialSigner;
pub use key::IssuerKey;
