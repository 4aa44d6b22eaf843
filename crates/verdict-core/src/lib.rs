//! # verdict-core
//!
//! Adapter trait definitions and the claim adjudication engine.
//!
//! The engine orchestrates one approve/reject call as a linear sequence of
//! blocking steps against four injected collaborators: the claim ledger,
//! the content-addressed evidence store, the credential signer, and the
//! outcome side index. The ledger is authoritative for claim state; the
//! evidence store is advisory and can never fail a committed decision.

pub mod config;
pub mod engine;
pub mod traits;
