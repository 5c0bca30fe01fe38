//! Capability interfaces for the external systems the pipeline touches.
//!
//! Each external collaborator sits behind a narrow async trait so the
//! orchestrator can be exercised with test doubles instead of real cloud
//! calls: the identity API, the audit store, and the summary service.

pub mod bigquery;
pub mod iam;
pub mod jsonl;
pub mod sim;
pub mod vertex;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::AuditRow;

// Re-export the concrete adapters
pub use bigquery::BigQueryClient;
pub use iam::IamClient;
pub use jsonl::JsonlAuditLog;
pub use sim::SimulatedDisabler;
pub use vertex::VertexClient;

/// Disables exactly one named credential per call.
///
/// A single remote state-changing call, no retries, no pre-checks.
/// Re-disabling an already-disabled key is a no-op on the remote side;
/// the implementation does not verify key state first.
#[async_trait]
pub trait CredentialDisabler: Send + Sync {
    async fn disable(&self, key_name: &str) -> Result<()>;
}

/// Appends one row to the durable audit store.
#[async_trait]
pub trait AuditAppender: Send + Sync {
    async fn append(&self, row: &AuditRow) -> Result<()>;
}

/// Produces a human-readable incident narrative.
///
/// The returned text is opaque to the pipeline: it is never parsed back
/// into structured data.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        key_name: &str,
        contained: bool,
        raw_log_text: &str,
    ) -> Result<String>;
}
