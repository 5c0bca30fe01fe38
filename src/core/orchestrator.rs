//! Pipeline orchestrator for one security event.
//!
//! Drives the state machine
//! `RECEIVED -> DECODED|DECODE_FAILED -> CONTAINED|CONTAIN_FAILED ->
//! AUDITED -> SUMMARIZED|SKIPPED` with one hard guarantee: every
//! invocation reaches the audit step exactly once, whatever failed
//! before it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::adapters::{AuditAppender, CredentialDisabler, Summarizer};
use crate::decode::decode_envelope;
use crate::domain::{AuditRow, ContainmentOutcome};

/// Terminal stage of one invocation.
///
/// `DecodeFailed` is terminal too: a parse failure is audited with the
/// sentinel key and the run stops there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Envelope never parsed; audited with the sentinel key and stopped.
    DecodeFailed,

    /// Containment succeeded and a narrative was produced.
    Summarized,

    /// Audited without a narrative (containment failed, summarizer absent
    /// or summarization degraded).
    Skipped,
}

/// What one invocation did, for the caller and the logs.
///
/// The audit row is the only durable signal; this report is in-memory
/// supplementary detail.
#[derive(Debug, Clone)]
pub struct HandlerReport {
    pub invocation_id: Uuid,
    pub stage: Stage,
    pub outcome: ContainmentOutcome,
    /// Whether the audit append itself succeeded. An audit failure is
    /// reported here and in the logs but never escapes the pipeline.
    pub audited: bool,
    pub summary: Option<String>,
}

/// Sequences decode, containment, audit and summarization for one event.
///
/// Holds no mutable state: concurrent invocations over distinct events
/// share nothing. The summarizer is optional enrichment; containment and
/// audit never depend on it.
pub struct Orchestrator {
    disabler: Arc<dyn CredentialDisabler>,
    audit: Arc<dyn AuditAppender>,
    summarizer: Option<Arc<dyn Summarizer>>,
}

impl Orchestrator {
    pub fn new(
        disabler: Arc<dyn CredentialDisabler>,
        audit: Arc<dyn AuditAppender>,
        summarizer: Option<Arc<dyn Summarizer>>,
    ) -> Self {
        Self {
            disabler,
            audit,
            summarizer,
        }
    }

    /// Handle one raw transport envelope, run to completion.
    ///
    /// Never returns an error: every failure mode is folded into the
    /// report after the audit row has been attempted. No retries, no
    /// cycles; redelivery is the transport's business and relies on the
    /// remote disable call being idempotent.
    #[instrument(skip_all)]
    pub async fn handle(&self, raw: &[u8]) -> HandlerReport {
        let invocation_id = Uuid::new_v4();
        info!(%invocation_id, "Handling security event envelope");

        // Decode. A parse failure is audited with the sentinel key and
        // ends the run: there is nothing concrete to contain.
        let event = match decode_envelope(raw) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Envelope failed to decode");
                let outcome = ContainmentOutcome::parse_failure(e.to_string());
                let audited = self.record(&outcome).await;
                return HandlerReport {
                    invocation_id,
                    stage: Stage::DecodeFailed,
                    outcome,
                    audited,
                    summary: None,
                };
            }
        };

        info!(key_name = %event.key_name, "Attempting to revoke key");

        // Contain: exactly one disable call per invocation. The actuator
        // reports failure as a value so control always reaches the audit
        // step below.
        let outcome = match self.disabler.disable(&event.key_name).await {
            Ok(()) => {
                info!(key_name = %event.key_name, "Key disabled");
                ContainmentOutcome::disabled(event.key_name.clone())
            }
            Err(e) => {
                error!(key_name = %event.key_name, error = %e, "Key disable failed");
                ContainmentOutcome::revoke_failure(event.key_name.clone(), e.to_string())
            }
        };

        // Audit unconditionally, success or failure alike.
        let audited = self.record(&outcome).await;

        // Summarize only a contained incident. A failed containment
        // escalates through channels outside this pipeline instead.
        let summary = if outcome.is_contained() {
            self.summarize(&event.key_name, &event.raw_log_text()).await
        } else {
            None
        };

        let stage = if summary.is_some() {
            Stage::Summarized
        } else {
            Stage::Skipped
        };

        HandlerReport {
            invocation_id,
            stage,
            outcome,
            audited,
            summary,
        }
    }

    /// Append the audit row for an outcome.
    ///
    /// An insert failure is logged and swallowed: it must not mask or
    /// reverse a containment result that already happened.
    async fn record(&self, outcome: &ContainmentOutcome) -> bool {
        let row = AuditRow::from_outcome(outcome);

        match self.audit.append(&row).await {
            Ok(()) => {
                info!(key_name = %row.key_name, status = %row.status, "Audit row appended");
                true
            }
            Err(e) => {
                error!(key_name = %row.key_name, error = %e, "Audit append failed");
                false
            }
        }
    }

    /// Best-effort narrative. Degrades to `None` when no summarizer is
    /// configured or the call fails.
    async fn summarize(&self, key_name: &str, raw_log_text: &str) -> Option<String> {
        let summarizer = self.summarizer.as_ref()?;

        match summarizer.summarize(key_name, true, raw_log_text).await {
            Ok(narrative) => Some(narrative),
            Err(e) => {
                warn!(error = %e, "Summarization failed, no narrative available");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct NoopDisabler;

    #[async_trait]
    impl CredentialDisabler for NoopDisabler {
        async fn disable(&self, _key_name: &str) -> Result<()> {
            Ok(())
        }
    }

    struct MemoryAudit {
        rows: Mutex<Vec<AuditRow>>,
    }

    #[async_trait]
    impl AuditAppender for MemoryAudit {
        async fn append(&self, row: &AuditRow) -> Result<()> {
            self.rows.lock().unwrap().push(row.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_decode_failure_is_audited_and_stops() {
        let audit = Arc::new(MemoryAudit {
            rows: Mutex::new(Vec::new()),
        });
        let orchestrator = Orchestrator::new(Arc::new(NoopDisabler), audit.clone(), None);

        let report = orchestrator.handle(b"garbage").await;

        assert_eq!(report.stage, Stage::DecodeFailed);
        assert!(report.audited);
        assert!(report.summary.is_none());

        let rows = audit.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key_name, "unknown");
        assert!(rows[0].status.starts_with("PARSE_FAILURE"));
    }
}
