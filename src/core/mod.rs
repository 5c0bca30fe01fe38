//! Core orchestration logic.
//!
//! This module contains:
//! - Orchestrator: drives one event through decode, containment, audit
//!   and optional summarization
//! - HandlerReport / Stage: the terminal state of one invocation

pub mod orchestrator;

// Re-export commonly used types
pub use orchestrator::{HandlerReport, Orchestrator, Stage};
