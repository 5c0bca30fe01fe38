//! The parsed trigger payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One security incident as delivered by the transport.
///
/// Constructed only by the envelope decoder; immutable afterwards. Exactly
/// one `IncidentEvent` exists per processing attempt, and it is never
/// persisted directly (only the derived audit row is).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentEvent {
    /// Fully-qualified resource name of the compromised key, e.g.
    /// `projects/<id>/serviceAccounts/<sa>/keys/<keyId>`.
    pub key_name: String,

    /// The original detection log entry, preserved verbatim for
    /// downstream summarization. Treated as opaque by the pipeline.
    pub raw_log: Value,
}

impl IncidentEvent {
    pub fn new(key_name: String, raw_log: Value) -> Self {
        Self { key_name, raw_log }
    }

    /// Raw log serialized as pretty JSON for embedding into a prompt.
    pub fn raw_log_text(&self) -> String {
        serde_json::to_string_pretty(&self.raw_log).unwrap_or_else(|_| self.raw_log.to_string())
    }
}
