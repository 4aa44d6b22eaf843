//! # verdict-query
//!
//! The read path: enumerating and presenting ledger claims.
//!
//! No state changes happen here — the service only probes `get_claim`
//! and reshapes records into externally-facing views.

pub mod service;
pub mod view;

pub use service::ClaimQueryService;
pub use view::ClaimView;
