//! Sequential-probe claim enumeration.
//!
//! The ledger exposes claims as a sparse, integer-keyed set with no
//! enumeration primitive, so the query service probes ids from 1 upward
//! and treats the first "does not exist" as the normal end of the set.
//! A deliberately minimal strategy: if the ledger ever assigns ids with
//! gaps, or holds more claims than the probe ceiling, enumeration is
//! incomplete — raise the ceiling or back the ledger with a real index
//! before that happens.

use tracing::{debug, warn};

use verdict_contracts::{
    claim::{Address, ClaimId},
    error::{AdjudicationError, VerdictResult},
};
use verdict_core::{config::DEFAULT_PROBE_CEILING, traits::LedgerClient};

use crate::view::ClaimView;

/// Read-only enumeration over the ledger's claims. Never changes state.
pub struct ClaimQueryService {
    ledger: Box<dyn LedgerClient>,
    probe_ceiling: u64,
}

impl ClaimQueryService {
    pub fn new(ledger: Box<dyn LedgerClient>) -> Self {
        Self {
            ledger,
            probe_ceiling: DEFAULT_PROBE_CEILING,
        }
    }

    pub fn with_probe_ceiling(ledger: Box<dyn LedgerClient>, probe_ceiling: u64) -> Self {
        Self {
            ledger,
            probe_ceiling,
        }
    }

    /// Enumerate all claims the probe can see.
    ///
    /// Probes ids `1..=probe_ceiling`; stops at the first id the ledger
    /// reports as nonexistent (the normal terminator) or at the first
    /// other error (logged and treated as the end of what is reliably
    /// enumerable, so a flaky ledger yields a short list rather than an
    /// error page).
    pub fn all_claims(&self) -> VerdictResult<Vec<ClaimView>> {
        let mut claims = Vec::new();

        for id in 1..=self.probe_ceiling {
            match self.ledger.get_claim(ClaimId(id)) {
                Ok(record) => claims.push(ClaimView::from_record(&record)),
                Err(AdjudicationError::NotFound { .. }) => {
                    debug!(probed = id, found = claims.len(), "claim enumeration complete");
                    return Ok(claims);
                }
                Err(e) => {
                    warn!(probed = id, error = %e, "claim enumeration stopped early");
                    return Ok(claims);
                }
            }
        }

        warn!(
            ceiling = self.probe_ceiling,
            "claim enumeration hit the probe ceiling; results may be incomplete"
        );
        Ok(claims)
    }

    /// All claims submitted by `provider`, matched case-insensitively.
    pub fn claims_for_provider(&self, provider: &Address) -> VerdictResult<Vec<ClaimView>> {
        let claims = self
            .all_claims()?
            .into_iter()
            .filter(|claim| Address::new(claim.provider.clone()).matches(provider))
            .collect();
        Ok(claims)
    }
}
