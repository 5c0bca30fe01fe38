//! Containment outcomes and the audit rows derived from them.
//!
//! Every processing attempt produces exactly one `ContainmentOutcome` and
//! exactly one `AuditRow`, regardless of which step failed. Both are
//! write-once: nothing in the pipeline updates them in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel key name used when the envelope never parsed.
pub const UNKNOWN_KEY: &str = "unknown";

/// Terminal classification of one containment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainmentStatus {
    /// The key was disabled via the identity API.
    SuccessDisabled,

    /// The disable call was attempted and failed.
    RevokeFailure,

    /// The envelope never decoded; no containment was attempted.
    ParseFailure,
}

/// Result of one containment attempt, produced once per invocation.
///
/// Flows only forward: to the audit recorder and (on success) the
/// summarizer. Never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainmentOutcome {
    /// Key the outcome refers to, or [`UNKNOWN_KEY`] on parse failure.
    pub key_name: String,

    pub status: ContainmentStatus,

    /// Captured error text when not successful.
    pub detail: Option<String>,
}

impl ContainmentOutcome {
    /// Containment succeeded for the named key.
    pub fn disabled(key_name: impl Into<String>) -> Self {
        Self {
            key_name: key_name.into(),
            status: ContainmentStatus::SuccessDisabled,
            detail: None,
        }
    }

    /// The disable call failed; the key is still considered live.
    pub fn revoke_failure(key_name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            key_name: key_name.into(),
            status: ContainmentStatus::RevokeFailure,
            detail: Some(detail.into()),
        }
    }

    /// The envelope never parsed; synthesized directly by the orchestrator.
    pub fn parse_failure(detail: impl Into<String>) -> Self {
        Self {
            key_name: UNKNOWN_KEY.to_string(),
            status: ContainmentStatus::ParseFailure,
            detail: Some(detail.into()),
        }
    }

    pub fn is_contained(&self) -> bool {
        self.status == ContainmentStatus::SuccessDisabled
    }

    /// Status string as written to the audit store.
    ///
    /// Failure labels carry the error text so the audit trail is useful
    /// without a second lookup: `REVOKE_FAILURE: <detail>`.
    pub fn status_label(&self) -> String {
        match (self.status, &self.detail) {
            (ContainmentStatus::SuccessDisabled, _) => "SUCCESS_DISABLED".to_string(),
            (ContainmentStatus::RevokeFailure, Some(d)) => format!("REVOKE_FAILURE: {}", d),
            (ContainmentStatus::RevokeFailure, None) => "REVOKE_FAILURE".to_string(),
            (ContainmentStatus::ParseFailure, Some(d)) => format!("PARSE_FAILURE: {}", d),
            (ContainmentStatus::ParseFailure, None) => "PARSE_FAILURE".to_string(),
        }
    }
}

/// One row of the append-only audit table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRow {
    /// When the outcome was recorded (ISO 8601 UTC).
    pub timestamp: DateTime<Utc>,

    /// Key name, or [`UNKNOWN_KEY`].
    pub key_name: String,

    /// Status label, see [`ContainmentOutcome::status_label`].
    pub status: String,
}

impl AuditRow {
    /// Derive the audit row for an outcome, stamped with the current time.
    pub fn from_outcome(outcome: &ContainmentOutcome) -> Self {
        Self {
            timestamp: Utc::now(),
            key_name: outcome.key_name.clone(),
            status: outcome.status_label(),
        }
    }
}
