//! Dry-Run Integration Tests
//!
//! Runs the full pipeline with the simulated disabler and a local JSONL
//! audit trail, the configuration the `handle --dry-run` command wires up.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::json;
use tempfile::TempDir;

use keywarden::adapters::{JsonlAuditLog, SimulatedDisabler};
use keywarden::{Orchestrator, Stage};

fn envelope(payload: serde_json::Value) -> Vec<u8> {
    json!({ "data": BASE64.encode(payload.to_string()) })
        .to_string()
        .into_bytes()
}

#[tokio::test]
async fn test_dry_run_audits_to_jsonl() {
    let temp = TempDir::new().unwrap();
    let log = Arc::new(JsonlAuditLog::new(temp.path().join("audit.jsonl")));

    let orchestrator = Orchestrator::new(Arc::new(SimulatedDisabler::new()), log.clone(), None);

    let raw = envelope(json!({ "key_name": "projects/p/serviceAccounts/sa/keys/k1" }));
    let report = orchestrator.handle(&raw).await;

    assert_eq!(report.stage, Stage::Skipped);
    assert!(report.audited);

    let rows = log.rows().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].key_name, "projects/p/serviceAccounts/sa/keys/k1");
    assert_eq!(rows[0].status, "SUCCESS_DISABLED");
}

#[tokio::test]
async fn test_dry_run_failure_path_is_audited() {
    let temp = TempDir::new().unwrap();
    let log = Arc::new(JsonlAuditLog::new(temp.path().join("audit.jsonl")));

    let orchestrator = Orchestrator::new(
        Arc::new(SimulatedDisabler::failing("quota exceeded")),
        log.clone(),
        None,
    );

    let raw = envelope(json!({ "key_name": "projects/p/serviceAccounts/sa/keys/k1" }));
    let report = orchestrator.handle(&raw).await;

    assert_eq!(report.stage, Stage::Skipped);

    let rows = log.rows().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].status.starts_with("REVOKE_FAILURE"));
    assert!(rows[0].status.contains("quota exceeded"));
}

#[tokio::test]
async fn test_dry_run_parse_failure_still_lands_in_the_trail() {
    let temp = TempDir::new().unwrap();
    let log = Arc::new(JsonlAuditLog::new(temp.path().join("audit.jsonl")));

    let orchestrator = Orchestrator::new(Arc::new(SimulatedDisabler::new()), log.clone(), None);

    let report = orchestrator.handle(b"{\"data\": \"%%%\"}").await;
    assert_eq!(report.stage, Stage::DecodeFailed);

    let rows = log.rows().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].key_name, "unknown");
    assert!(rows[0].status.starts_with("PARSE_FAILURE"));
}

#[tokio::test]
async fn test_consecutive_invocations_append() {
    let temp = TempDir::new().unwrap();
    let log = Arc::new(JsonlAuditLog::new(temp.path().join("audit.jsonl")));

    let orchestrator = Orchestrator::new(Arc::new(SimulatedDisabler::new()), log.clone(), None);

    for _ in 0..3 {
        let raw = envelope(json!({ "key_name": "projects/p/serviceAccounts/sa/keys/k1" }));
        orchestrator.handle(&raw).await;
    }

    // One row per invocation, append-only
    assert_eq!(log.rows().await.unwrap().len(), 3);
}
