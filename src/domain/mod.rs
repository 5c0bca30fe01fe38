//! Domain types for the keywarden pipeline.
//!
//! This module contains the core data structures:
//! - IncidentEvent: the parsed trigger payload
//! - ContainmentOutcome: result of one containment attempt
//! - AuditRow: durable record of that attempt

pub mod incident;
pub mod outcome;

// Re-export commonly used types
pub use incident::IncidentEvent;
pub use outcome::{AuditRow, ContainmentOutcome, ContainmentStatus, UNKNOWN_KEY};
