//! # verdict-ledger
//!
//! Reference implementation of the Verdict `LedgerClient` contract.
//!
//! The real system of record is an external contract; this crate provides
//! the in-memory stand-in used by the demo and the test suites. It
//! enforces the full ledger contract — insurer-only transitions, the
//! forward-only state table, typed errors for everything illegal — so code
//! written against it behaves identically against a real ledger adapter.

pub mod memory;

pub use memory::{ClaimSubmission, InMemoryLedger};
