//! IAM adapter for disabling service-account keys.
//!
//! Calls the `serviceAccounts.keys.disable` REST method directly. The
//! remote API treats disabling an already-disabled key as a no-op, which
//! is what makes transport-level redelivery safe.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use super::CredentialDisabler;

/// IAM REST client scoped to key disablement.
pub struct IamClient {
    /// OAuth2 bearer token
    access_token: String,
    /// API base, overridable for tests
    base_url: String,
    /// HTTP client
    client: reqwest::Client,
}

/// Error body returned by Google APIs
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl IamClient {
    /// Create a new IAM client
    pub fn new(access_token: String) -> Self {
        Self::with_base_url(access_token, "https://iam.googleapis.com".to_string())
    }

    /// Create a client against a custom API base (test servers)
    pub fn with_base_url(access_token: String, base_url: String) -> Self {
        Self {
            access_token,
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Build the disable URL for a fully-qualified key name
    fn disable_url(&self, key_name: &str) -> String {
        format!("{}/v1/{}:disable", self.base_url, key_name)
    }
}

#[async_trait]
impl CredentialDisabler for IamClient {
    async fn disable(&self, key_name: &str) -> Result<()> {
        let url = self.disable_url(key_name);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({}))
            .send()
            .await
            .context("Failed to reach the IAM API")?;

        let status = response.status();
        if !status.is_success() {
            // Prefer the API's own message when the body parses
            let message = match response.json::<ApiErrorBody>().await {
                Ok(body) => body.error.message,
                Err(_) => format!("HTTP {}", status),
            };
            anyhow::bail!("IAM disable failed for '{}': {}", key_name, message);
        }

        Ok(())
    }
}
