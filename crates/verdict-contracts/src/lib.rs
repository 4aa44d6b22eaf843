//! # verdict-contracts
//!
//! Shared types, schemas, and contracts for the Verdict adjudication runtime.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions and error types.

pub mod claim;
pub mod credential;
pub mod error;
pub mod key;
