//! # verdict-evidence
//!
//! Content-addressed evidence storage for the Verdict runtime.
//!
//! Blobs are immutable and addressed by the SHA-256 of their bytes, so
//! storing identical content twice is a no-op and a fetched blob is
//! self-verifying. The adjudication engine treats this store as advisory:
//! it enriches credentials from it and persists artifacts into it, but a
//! committed ledger decision never fails because this store is down.

pub mod content;
pub mod index;
pub mod memory;

pub use content::content_id_for;
pub use index::InMemoryOutcomeIndex;
pub use memory::InMemoryEvidenceStore;
