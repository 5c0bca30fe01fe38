//! Simulated containment for dry runs.
//!
//! Logs the action it would have taken and succeeds without touching the
//! identity API. Useful for rehearsing the pipeline against captured
//! envelopes in an account where real revocation is off-limits.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use super::CredentialDisabler;

/// Disabler that performs no remote call.
#[derive(Debug, Default)]
pub struct SimulatedDisabler {
    /// When set, every call fails with this message (failure-path rehearsal)
    fail_with: Option<String>,
}

impl SimulatedDisabler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a failing identity API
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
        }
    }
}

#[async_trait]
impl CredentialDisabler for SimulatedDisabler {
    async fn disable(&self, key_name: &str) -> Result<()> {
        if let Some(message) = &self.fail_with {
            anyhow::bail!("simulated IAM failure: {}", message);
        }

        info!(key_name, "DRY RUN: would call serviceAccounts.keys.disable");
        Ok(())
    }
}
