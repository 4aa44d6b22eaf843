//! TOML-driven runtime configuration.
//!
//! Loaded once at startup by the hosting binary and used to construct the
//! engine's collaborators. Nothing here is consulted on the hot path.

use std::path::Path;

use serde::Deserialize;

use verdict_contracts::error::{AdjudicationError, VerdictResult};

/// Upper bound on sequential claim-id probing in the query service.
///
/// The ledger exposes claims as a sparse, non-enumerable set; enumeration
/// probes ids from 1 until the first gap or this ceiling. Deployments with
/// more claims than this must raise it — enumeration past the ceiling is
/// silently incomplete otherwise.
pub const DEFAULT_PROBE_CEILING: u64 = 100;

/// Top-level runtime configuration.
///
/// ```toml
/// [insurer]
/// did = "did:key:z6MkhaXgBZD..."
/// address = "0xAAA"
/// signing_key_hex = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60"
///
/// [query]
/// probe_ceiling = 100
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    pub insurer: InsurerConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

/// The insurer identity this runtime adjudicates as.
#[derive(Debug, Clone, Deserialize)]
pub struct InsurerConfig {
    /// Credential issuer DID.
    pub did: String,
    /// On-ledger address, matched against each claim's assigned insurer.
    pub address: String,
    /// Hex-encoded Ed25519 seed for credential signing.
    pub signing_key_hex: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_probe_ceiling")]
    pub probe_ceiling: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            probe_ceiling: DEFAULT_PROBE_CEILING,
        }
    }
}

fn default_probe_ceiling() -> u64 {
    DEFAULT_PROBE_CEILING
}

impl RuntimeConfig {
    /// Parse `s` as TOML runtime configuration.
    pub fn from_toml_str(s: &str) -> VerdictResult<Self> {
        toml::from_str(s).map_err(|e| AdjudicationError::Config {
            reason: format!("failed to parse runtime config TOML: {}", e),
        })
    }

    /// Read the file at `path` and parse it as TOML runtime configuration.
    pub fn from_file(path: &Path) -> VerdictResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AdjudicationError::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }
}
