//! File-based audit trail using newline-delimited JSON.
//!
//! Dry runs still honor the one-row-per-attempt audit guarantee; they just
//! write it to a local JSONL file instead of the remote table.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::domain::AuditRow;

use super::AuditAppender;

/// Append-only JSONL audit log
pub struct JsonlAuditLog {
    path: PathBuf,
}

impl JsonlAuditLog {
    /// Create a log that appends to the given file, creating it on first use
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back all rows (inspection and tests)
    pub async fn rows(&self) -> Result<Vec<AuditRow>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read audit log: {}", self.path.display()))?;

        content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).context("Malformed audit log line"))
            .collect()
    }
}

#[async_trait]
impl AuditAppender for JsonlAuditLog {
    async fn append(&self, row: &AuditRow) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open audit log: {}", self.path.display()))?;

        let json = serde_json::to_string(row).context("Failed to serialize audit row")?;
        file.write_all(format!("{}\n", json).as_bytes())
            .await
            .context("Failed to append audit row")?;
        file.flush().await.context("Failed to flush audit log")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContainmentOutcome;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_append_and_read_back() {
        let temp = TempDir::new().unwrap();
        let log = JsonlAuditLog::new(temp.path().join("audit.jsonl"));

        let row = AuditRow::from_outcome(&ContainmentOutcome::disabled(
            "projects/p/serviceAccounts/sa/keys/k1",
        ));
        log.append(&row).await.unwrap();
        log.append(&AuditRow::from_outcome(&ContainmentOutcome::parse_failure(
            "bad envelope",
        )))
        .await
        .unwrap();

        let rows = log.rows().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].status, "SUCCESS_DISABLED");
        assert_eq!(rows[1].key_name, "unknown");
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let temp = TempDir::new().unwrap();
        let log = JsonlAuditLog::new(temp.path().join("absent.jsonl"));
        assert!(log.rows().await.unwrap().is_empty());
    }
}
