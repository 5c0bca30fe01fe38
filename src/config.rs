//! Process configuration for keywarden.
//!
//! Everything is resolved from the environment once at startup into an
//! explicit struct that gets passed into adapter construction. There is
//! no global config cache and no process-wide mutable state: concurrent
//! invocations must share nothing.

use std::env;

use anyhow::{Context, Result};

/// Default Vertex AI location
const DEFAULT_LOCATION: &str = "us-central1";

/// Default Vertex AI model for triage summaries
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Resolved process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Project hosting the audit dataset and the Vertex model
    pub project_id: String,
    /// Audit dataset id
    pub dataset_id: String,
    /// Audit table id
    pub table_id: String,
    /// OAuth2 bearer token for the Google APIs
    pub access_token: String,
    /// Vertex AI location
    pub vertex_location: String,
    /// Vertex AI model name
    pub vertex_model: String,
    /// When true, skip the summarization step entirely
    pub disable_summary: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `PROJECT_ID`, `DATASET_ID`, `TABLE_ID` and `GOOGLE_ACCESS_TOKEN`
    /// are required; `VERTEX_LOCATION`, `VERTEX_MODEL` and
    /// `KEYWARDEN_DISABLE_SUMMARY` are optional.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            project_id: require("PROJECT_ID")?,
            dataset_id: require("DATASET_ID")?,
            table_id: require("TABLE_ID")?,
            access_token: require("GOOGLE_ACCESS_TOKEN")?,
            vertex_location: env::var("VERTEX_LOCATION")
                .unwrap_or_else(|_| DEFAULT_LOCATION.to_string()),
            vertex_model: env::var("VERTEX_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            disable_summary: env::var("KEYWARDEN_DISABLE_SUMMARY")
                .map(|v| truthy(&v))
                .unwrap_or(false),
        })
    }
}

fn require(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("Missing required environment variable: {}", name))
}

fn truthy(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_required_var_names_the_variable() {
        // A variable nothing in the environment would plausibly set
        let err = require("KEYWARDEN_TEST_NOT_SET_7f3a").unwrap_err();
        assert!(err.to_string().contains("KEYWARDEN_TEST_NOT_SET_7f3a"));
    }

    #[test]
    fn test_truthy_values() {
        assert!(truthy("1"));
        assert!(truthy("true"));
        assert!(truthy("TRUE"));
        assert!(!truthy("0"));
        assert!(!truthy("no"));
        assert!(!truthy(""));
    }
}
