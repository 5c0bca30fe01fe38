//! Command-line interface for keywarden.
//!
//! The binary is a thin host shim around the event-triggered pipeline:
//! it reads one transport envelope, runs it through the orchestrator,
//! and prints the report. There is no long-running surface here.

use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::{
    BigQueryClient, IamClient, JsonlAuditLog, SimulatedDisabler, Summarizer, VertexClient,
};
use crate::config::Config;
use crate::core::Orchestrator;
use crate::decode::decode_envelope;

/// keywarden - automated containment and audit for compromised keys
#[derive(Parser, Debug)]
#[command(name = "keywarden")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Handle one transport envelope end to end
    Handle {
        /// Envelope file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Simulate containment and audit to a local JSONL file
        /// instead of calling the real APIs
        #[arg(long)]
        dry_run: bool,

        /// Audit file used in dry-run mode
        #[arg(long, default_value = "keywarden-audit.jsonl")]
        audit_file: PathBuf,
    },

    /// Decode an envelope and print the parsed event (no side effects)
    Decode {
        /// Envelope file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Handle {
                input,
                dry_run,
                audit_file,
            } => handle(input, dry_run, audit_file).await,
            Commands::Decode { input } => decode(input).await,
        }
    }
}

/// Read the envelope from a file or stdin
fn read_envelope(input: Option<PathBuf>) -> Result<Vec<u8>> {
    match input {
        Some(path) => std::fs::read(&path)
            .with_context(|| format!("Failed to read envelope file: {}", path.display())),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read envelope from stdin")?;
            Ok(buf)
        }
    }
}

async fn handle(input: Option<PathBuf>, dry_run: bool, audit_file: PathBuf) -> Result<()> {
    let raw = read_envelope(input)?;

    let orchestrator = if dry_run {
        Orchestrator::new(
            Arc::new(SimulatedDisabler::new()),
            Arc::new(JsonlAuditLog::new(audit_file)),
            None,
        )
    } else {
        let config = Config::from_env()?;

        let summarizer: Option<Arc<dyn Summarizer>> = if config.disable_summary {
            None
        } else {
            Some(Arc::new(VertexClient::new(
                config.access_token.clone(),
                config.project_id.clone(),
                config.vertex_location.clone(),
                config.vertex_model.clone(),
            )))
        };

        Orchestrator::new(
            Arc::new(IamClient::new(config.access_token.clone())),
            Arc::new(BigQueryClient::new(
                config.access_token,
                config.project_id,
                config.dataset_id,
                config.table_id,
            )),
            summarizer,
        )
    };

    let report = orchestrator.handle(&raw).await;

    println!("Invocation: {}", report.invocation_id);
    println!("Key:        {}", report.outcome.key_name);
    println!("Status:     {}", report.outcome.status_label());
    println!("Audited:    {}", report.audited);
    if let Some(summary) = &report.summary {
        println!("\n{}", summary);
    }

    Ok(())
}

async fn decode(input: Option<PathBuf>) -> Result<()> {
    let raw = read_envelope(input)?;
    let event = decode_envelope(&raw).context("Envelope failed to decode")?;

    println!("Key:     {}", event.key_name);
    println!("Raw log:\n{}", event.raw_log_text());

    Ok(())
}
