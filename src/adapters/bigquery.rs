//! BigQuery adapter for the append-only audit table.
//!
//! Uses the streaming `insertAll` tabledata method. The table has a fixed
//! schema of `timestamp`, `key_name`, `status`; no updates, no deletes,
//! no reads. Concurrent appends from independent invocations are fine.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::domain::AuditRow;

use super::AuditAppender;

/// BigQuery streaming-insert client for one fixed table.
pub struct BigQueryClient {
    access_token: String,
    project_id: String,
    dataset_id: String,
    table_id: String,
    /// API base, overridable for tests
    base_url: String,
    client: reqwest::Client,
}

/// Response from tabledata.insertAll
#[derive(Debug, Deserialize)]
struct InsertAllResponse {
    #[serde(rename = "insertErrors", default)]
    insert_errors: Vec<InsertError>,
}

#[derive(Debug, Deserialize)]
struct InsertError {
    #[serde(default)]
    errors: Vec<RowError>,
}

#[derive(Debug, Deserialize)]
struct RowError {
    #[serde(default)]
    message: String,
}

impl BigQueryClient {
    /// Create a client for the configured audit table
    pub fn new(
        access_token: String,
        project_id: String,
        dataset_id: String,
        table_id: String,
    ) -> Self {
        Self::with_base_url(
            access_token,
            project_id,
            dataset_id,
            table_id,
            "https://bigquery.googleapis.com".to_string(),
        )
    }

    /// Create a client against a custom API base (test servers)
    pub fn with_base_url(
        access_token: String,
        project_id: String,
        dataset_id: String,
        table_id: String,
        base_url: String,
    ) -> Self {
        Self {
            access_token,
            project_id,
            dataset_id,
            table_id,
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Build the insertAll URL for the audit table
    fn insert_url(&self) -> String {
        format!(
            "{}/bigquery/v2/projects/{}/datasets/{}/tables/{}/insertAll",
            self.base_url, self.project_id, self.dataset_id, self.table_id
        )
    }
}

#[async_trait]
impl AuditAppender for BigQueryClient {
    async fn append(&self, row: &AuditRow) -> Result<()> {
        let url = self.insert_url();

        let body = json!({
            "rows": [{
                "json": {
                    "timestamp": row.timestamp.to_rfc3339(),
                    "key_name": row.key_name,
                    "status": row.status,
                }
            }]
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .context("Failed to reach the BigQuery API")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("BigQuery insertAll failed: HTTP {}", status);
        }

        // insertAll reports per-row failures in a 200 response
        let parsed: InsertAllResponse = response
            .json()
            .await
            .context("Failed to parse insertAll response")?;

        if !parsed.insert_errors.is_empty() {
            let first = parsed
                .insert_errors
                .first()
                .and_then(|e| e.errors.first())
                .map(|e| e.message.clone())
                .unwrap_or_default();
            anyhow::bail!("BigQuery rejected the audit row: {}", first);
        }

        Ok(())
    }
}
