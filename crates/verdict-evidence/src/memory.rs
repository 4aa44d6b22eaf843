//! In-memory implementation of `EvidenceStore`.
//!
//! `InMemoryEvidenceStore` keeps blobs in a `HashMap` keyed by their
//! content id, protected by a `Mutex`. Clones share state.
//!
//! The store can be switched to an "unavailable" mode in which every
//! operation fails with `EvidenceUnavailable` — the demo and tests use
//! this to exercise the engine's degraded path, where adjudication must
//! still succeed with sentinel values.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use verdict_contracts::{
    claim::ContentId,
    error::{AdjudicationError, VerdictResult},
};
use verdict_core::traits::EvidenceStore;

use crate::content::content_id_for;

struct StoreState {
    blobs: HashMap<ContentId, Vec<u8>>,
    unavailable: bool,
}

/// An in-memory content-addressed blob store.
#[derive(Clone)]
pub struct InMemoryEvidenceStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryEvidenceStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState {
                blobs: HashMap::new(),
                unavailable: false,
            })),
        }
    }

    /// Simulate the store going down (or coming back). While unavailable,
    /// every `put` and `get` fails with `EvidenceUnavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.unavailable = unavailable;
        }
    }

    fn lock(&self) -> VerdictResult<std::sync::MutexGuard<'_, StoreState>> {
        let state = self
            .state
            .lock()
            .map_err(|e| AdjudicationError::EvidenceUnavailable {
                reason: format!("evidence store lock poisoned: {}", e),
            })?;
        if state.unavailable {
            return Err(AdjudicationError::EvidenceUnavailable {
                reason: "evidence store is unreachable".to_string(),
            });
        }
        Ok(state)
    }
}

impl Default for InMemoryEvidenceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EvidenceStore for InMemoryEvidenceStore {
    fn put(&self, bytes: &[u8]) -> VerdictResult<ContentId> {
        let mut state = self.lock()?;
        let id = content_id_for(bytes);
        // Idempotent by construction: re-inserting the same content under
        // the same id is a no-op.
        state.blobs.entry(id.clone()).or_insert_with(|| bytes.to_vec());
        debug!(content_id = %id, size = bytes.len(), "blob stored");
        Ok(id)
    }

    fn get(&self, id: &ContentId) -> VerdictResult<Vec<u8>> {
        self.lock()?
            .blobs
            .get(id)
            .cloned()
            .ok_or_else(|| AdjudicationError::not_found("evidence blob", id))
    }
}
