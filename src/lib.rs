//! keywarden - automated containment and audit for compromised keys
//!
//! An event-triggered security-response pipeline: when the control plane
//! reports creation of a suspicious service-account key, keywarden
//! disables the key, records exactly one audit row for the attempt, and
//! (when containment succeeded) produces a human-readable incident
//! narrative via a generative-text model.
//!
//! # Architecture
//!
//! One invocation handles one event, run to completion:
//!
//! ```text
//! envelope --decode--> IncidentEvent --disable--> ContainmentOutcome
//!                                                       |
//!                                            audit (always, exactly once)
//!                                                       |
//!                                         summarize (only on containment)
//! ```
//!
//! The external collaborators sit behind narrow traits
//! ([`adapters::CredentialDisabler`], [`adapters::AuditAppender`],
//! [`adapters::Summarizer`]) so the whole state machine is testable
//! without cloud calls.
//!
//! # Modules
//!
//! - `decode`: transport envelope decoding and validation
//! - `domain`: data structures (IncidentEvent, ContainmentOutcome, AuditRow)
//! - `adapters`: external system integrations (IAM, BigQuery, Vertex AI)
//! - `core`: the pipeline orchestrator
//! - `cli`: command-line host shim
//!
//! # Usage
//!
//! ```bash
//! # Handle an envelope delivered by the trigger
//! keywarden handle --input envelope.json
//!
//! # Rehearse against a captured envelope, audit to a local file
//! keywarden handle --input envelope.json --dry-run
//!
//! # Inspect what an envelope decodes to
//! keywarden decode --input envelope.json
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod decode;
pub mod domain;

// Re-export main types at crate root for convenience
pub use self::core::{HandlerReport, Orchestrator, Stage};
pub use decode::{decode_envelope, DecodeError};
pub use domain::{AuditRow, ContainmentOutcome, ContainmentStatus, IncidentEvent, UNKNOWN_KEY};
