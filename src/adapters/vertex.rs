//! Vertex AI adapter for post-containment triage summaries.
//!
//! Sends a single `generateContent` request whose prompt reports an action
//! *already taken*: the engineer reading the narrative should learn what
//! happened, what was done automatically, and what to investigate next.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::Summarizer;

/// Vertex AI generateContent client.
pub struct VertexClient {
    access_token: String,
    project_id: String,
    location: String,
    model: String,
    /// API base, overridable for tests
    base_url: Option<String>,
    client: reqwest::Client,
}

/// Response from generateContent (only the fields we read)
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Debug, Deserialize)]
struct TextPart {
    #[serde(default)]
    text: String,
}

impl VertexClient {
    /// Create a new Vertex client
    pub fn new(access_token: String, project_id: String, location: String, model: String) -> Self {
        Self {
            access_token,
            project_id,
            location,
            model,
            base_url: None,
            client: reqwest::Client::new(),
        }
    }

    /// Override the API base (test servers)
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Build the generateContent URL
    fn generate_url(&self) -> String {
        let base = match &self.base_url {
            Some(base) => base.clone(),
            None => format!("https://{}-aiplatform.googleapis.com", self.location),
        };
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            base, self.project_id, self.location, self.model
        )
    }
}

/// Compose the post-containment triage prompt.
///
/// The prompt embeds the key name, the action taken, whether it succeeded,
/// and the full raw log text.
pub fn build_triage_prompt(key_name: &str, contained: bool, raw_log_text: &str) -> String {
    format!(
        "You are a \"Zero-Toil\" cloud SOAR analyst.\n\
         A high-priority \"CreateServiceAccountKey\" alert was just detected.\n\
         \n\
         An automated containment action has ALREADY been taken:\n\
         - Target Key: {key_name}\n\
         - Action Taken: DisableServiceAccountKey\n\
         - Containment Success: {contained}\n\
         \n\
         Parse the following raw JSON log, confirm the automated action, and\n\
         write an \"Incident & Response Summary\" for the on-call SecOps\n\
         engineer: what happened, what was done automatically, and what they\n\
         need to investigate next.\n\
         \n\
         Raw JSON Log:\n\
         {raw_log_text}\n"
    )
}

#[async_trait]
impl Summarizer for VertexClient {
    async fn summarize(
        &self,
        key_name: &str,
        contained: bool,
        raw_log_text: &str,
    ) -> Result<String> {
        let url = self.generate_url();
        let prompt = build_triage_prompt(key_name, contained, raw_log_text);

        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }]
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .context("Failed to reach the Vertex AI API")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Vertex generateContent failed: HTTP {}", status);
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .context("Failed to parse generateContent response")?;

        let narrative: String = parsed
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if narrative.trim().is_empty() {
            anyhow::bail!("Vertex returned an empty narrative");
        }

        Ok(narrative)
    }
}
