//! Content addressing: deriving a blob's identifier from its bytes.
//!
//! A content id is the lowercase-hex SHA-256 of the blob. Deriving the id
//! from the content makes re-`put` idempotent by construction: identical
//! bytes always resolve to the identical id, and a stored blob can never
//! change under its id.

use sha2::{Digest, Sha256};

use verdict_contracts::claim::ContentId;

/// Compute the content identifier for `bytes`.
pub fn content_id_for(bytes: &[u8]) -> ContentId {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    ContentId(hex::encode(hasher.finalize()))
}
