//! Verdict claims adjudication — demo CLI.
//!
//! Wires the real engine, signer, and query service to in-memory ledger
//! and evidence-store implementations, seeds a handful of claims, and
//! drives the approve/reject/query flows end-to-end through the API
//! handlers.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- approve-flow
//!   cargo run -p demo -- reject-flow
//!   cargo run -p demo -- list-claims
//!   cargo run -p demo -- --config runtime.toml run-all

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use verdict_api::{
    handle_approve, handle_list_claims, handle_provider_claims, handle_reject,
    ApproveClaimRequest, RejectClaimRequest,
};
use verdict_contracts::{
    claim::{Address, ClaimId, ContentId},
    error::{AdjudicationError, VerdictResult},
};
use verdict_core::{
    config::{InsurerConfig, QueryConfig, RuntimeConfig},
    engine::AdjudicationEngine,
    traits::{CredentialSigner, EvidenceStore, OutcomeIndex},
};
use verdict_evidence::{InMemoryEvidenceStore, InMemoryOutcomeIndex};
use verdict_ledger::{ClaimSubmission, InMemoryLedger};
use verdict_query::ClaimQueryService;
use verdict_signer::{Ed25519CredentialSigner, IssuerKey};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Verdict — medical-insurance claim adjudication demo.
///
/// Each subcommand drives one or all of the adjudication flows against a
/// seeded in-memory ledger and evidence store.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "Verdict claims adjudication demo",
    long_about = "Runs the Verdict adjudication flows end-to-end: claim approval with\n\
                  credential issuance, rejection with a degraded evidence store, and\n\
                  claim enumeration through the query service."
)]
struct Cli {
    /// Optional TOML runtime configuration (insurer identity + query limits).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all three flows in sequence.
    RunAll,
    /// Approve a claim and verify the issued settlement credential.
    ApproveFlow,
    /// Reject a claim while the evidence store is unreachable.
    RejectFlow,
    /// Enumerate claims and filter them by provider.
    ListClaims,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Structured logging; set RUST_LOG=debug for the full pipeline trace.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(1);
        }
    };

    print_banner();

    let result = match cli.command {
        Command::RunAll => run_all(&config),
        Command::ApproveFlow => approve_flow(&config),
        Command::RejectFlow => reject_flow(&config),
        Command::ListClaims => list_claims(&config),
    };

    match result {
        Ok(()) => println!("\nAll selected flows completed."),
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> VerdictResult<RuntimeConfig> {
    match path {
        Some(path) => RuntimeConfig::from_file(path),
        // No config file: a throwaway insurer identity with a freshly
        // generated key.
        None => Ok(RuntimeConfig {
            insurer: InsurerConfig {
                did: "did:key:demo-insurer".to_string(),
                address: "0xAAA".to_string(),
                signing_key_hex: IssuerKey::generate().material().hex().to_string(),
            },
            query: QueryConfig::default(),
        }),
    }
}

// ── Fixture stack ─────────────────────────────────────────────────────────────

struct Stack {
    engine: AdjudicationEngine,
    query: ClaimQueryService,
    evidence: InMemoryEvidenceStore,
    index: InMemoryOutcomeIndex,
    /// claim with a treatment credential, one without, one for the
    /// degraded-store flow
    claims: [ClaimId; 3],
}

/// Build the full in-memory stack and seed it:
/// - claim 1: linked treatment credential already in the evidence store
/// - claim 2: no treatment credential
/// - claim 3: used by the degraded evidence-store rejection flow
fn seed_stack(config: &RuntimeConfig) -> VerdictResult<Stack> {
    let ledger = InMemoryLedger::new();
    let evidence = InMemoryEvidenceStore::new();
    let index = InMemoryOutcomeIndex::new();
    let insurer = Address::new(config.insurer.address.clone());

    // A treatment credential previously issued by the provider.
    let treatment = serde_json::json!({
        "type": ["VerifiableCredential", "TreatmentCredential"],
        "credentialSubject": {
            "treatmentDescription": "Arthroscopic knee surgery, outpatient",
            "billAmount": "185000"
        }
    });
    let treatment_bytes =
        serde_json::to_vec(&treatment).map_err(|e| AdjudicationError::InvalidRequest {
            reason: e.to_string(),
        })?;
    let treatment_ref = evidence.put(&treatment_bytes)?;

    let first = ledger.submit_claim(ClaimSubmission {
        policy_id: 1001,
        provider: Address::new("0xPROV1"),
        beneficiary: Address::new("0xBEN1"),
        insurer: insurer.clone(),
        amount: "185000".to_string(),
        evidence_ref: None,
        treatment_credential_ref: Some(treatment_ref),
    })?;

    let second = ledger.submit_claim(ClaimSubmission {
        policy_id: 1002,
        provider: Address::new("0xPROV2"),
        beneficiary: Address::new("0xBEN2"),
        insurer: insurer.clone(),
        amount: "42000".to_string(),
        evidence_ref: Some(ContentId("a".repeat(64))),
        treatment_credential_ref: None,
    })?;

    let third = ledger.submit_claim(ClaimSubmission {
        policy_id: 1003,
        provider: Address::new("0xPROV1"),
        beneficiary: Address::new("0xBEN3"),
        insurer,
        amount: "9900".to_string(),
        evidence_ref: None,
        treatment_credential_ref: None,
    })?;

    let engine = AdjudicationEngine::new(
        Box::new(ledger.clone()),
        Box::new(evidence.clone()),
        Box::new(Ed25519CredentialSigner::new()),
        Box::new(index.clone()),
    );
    let query =
        ClaimQueryService::with_probe_ceiling(Box::new(ledger), config.query.probe_ceiling);

    Ok(Stack {
        engine,
        query,
        evidence,
        index,
        claims: [first, second, third],
    })
}

// ── Flows ─────────────────────────────────────────────────────────────────────

fn run_all(config: &RuntimeConfig) -> VerdictResult<()> {
    approve_flow(config)?;
    reject_flow(config)?;
    list_claims(config)
}

fn approve_flow(config: &RuntimeConfig) -> VerdictResult<()> {
    println!("── Approve flow ──────────────────────────────────────────────");
    let stack = seed_stack(config)?;
    let [first, ..] = stack.claims;

    let request = ApproveClaimRequest {
        claim_id: first.0,
        insurer_did: config.insurer.did.clone(),
        insurer_address: config.insurer.address.clone(),
        signing_key: config.insurer.signing_key_hex.clone(),
    };

    let response = handle_approve(&stack.engine, &request);
    print_json("POST /claims/approve", &response);

    // Any holder can verify the persisted artifact offline.
    if let Some(cid) = &response.artifact_cid {
        let bytes = stack.evidence.get(&ContentId(cid.clone()))?;
        let raw: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|e| AdjudicationError::InvalidRequest {
                reason: e.to_string(),
            })?;
        let verification = Ed25519CredentialSigner::new().verify(&raw);
        print_json("offline verification of the stored credential", &verification);
    }

    // The side index resolves "the credential for policy 1001" without
    // scanning the store.
    if let Some(cid) = stack.index.by_policy(1001)? {
        println!("\ncredential for policy 1001: {}", cid);
    }

    // A second approve call replays the stored artifact instead of
    // minting a duplicate — note the absent txHash.
    let replay = handle_approve(&stack.engine, &request);
    print_json("POST /claims/approve (retried)", &replay);
    Ok(())
}

fn reject_flow(config: &RuntimeConfig) -> VerdictResult<()> {
    println!("── Reject flow (evidence store down) ─────────────────────────");
    let stack = seed_stack(config)?;
    let [_, _, third] = stack.claims;

    // Take the evidence store down: the decision must still commit, with
    // sentinel treatment fields and no persisted artifact.
    stack.evidence.set_unavailable(true);

    let response = handle_reject(
        &stack.engine,
        &RejectClaimRequest {
            claim_id: third.0,
            reason: "procedure not covered under policy 1003".to_string(),
            insurer_did: config.insurer.did.clone(),
            insurer_address: config.insurer.address.clone(),
            signing_key: config.insurer.signing_key_hex.clone(),
        },
    );
    print_json("POST /claims/reject", &response);

    stack.evidence.set_unavailable(false);
    Ok(())
}

fn list_claims(config: &RuntimeConfig) -> VerdictResult<()> {
    println!("── Query flow ────────────────────────────────────────────────");
    let stack = seed_stack(config)?;

    let all = handle_list_claims(&stack.query);
    print_json("GET /claims", &all);

    let filtered = handle_provider_claims(&stack.query, "0xprov1");
    print_json("GET /claims/provider/0xprov1", &filtered);
    Ok(())
}

// ── Output helpers ────────────────────────────────────────────────────────────

fn print_json<T: serde::Serialize>(label: &str, value: &T) {
    println!("\n{}:", label);
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => println!("<unprintable: {}>", e),
    }
}

fn print_banner() {
    println!();
    println!("Verdict — claim adjudication & credential issuance");
    println!("==================================================");
    println!();
    println!("Pipeline per decision:");
    println!("  [1] Load claim from the ledger, authorize the acting insurer");
    println!("  [2] Auto-advance Submitted → UnderReview, then commit the decision");
    println!("  [3] Enrich from the linked treatment credential (sentinels on failure)");
    println!("  [4] Build + sign the outcome credential with the insurer's Ed25519 key");
    println!("  [5] Best-effort persist to the content-addressed store + outcome index");
    println!();
}
