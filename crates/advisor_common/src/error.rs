//! Error taxonomy for the query-resolution core.
//!
//! Only `LoadTimeInvariantViolation` is fatal, and only at startup. Every
//! per-query error is caught at the engine boundary and converted into a
//! valid low-confidence response record.

use thiserror::Error;

/// Errors produced by the advising core
#[derive(Debug, Clone, Error)]
pub enum AdvisorError {
    /// Referenced course, track, or template is absent from the knowledge base.
    /// Surfaced to the caller as a structured "don't know" answer.
    #[error("not found in knowledge base: {0}")]
    NotFound(String),

    /// Conflicting detections for the same signal field. Resolved by the
    /// documented first-match tie-break; never fatal.
    #[error("ambiguous signal: {0}")]
    AmbiguousSignal(String),

    /// Generative or people-search collaborator failed or timed out.
    #[error("external collaborator unavailable: {0}")]
    ExternalUnavailable(String),

    /// Knowledge base failed validation at load time (cyclic prerequisite
    /// graph, dangling reference, malformed catalog). Fatal to startup.
    #[error("knowledge base invariant violated: {0}")]
    LoadTimeInvariantViolation(String),
}

impl AdvisorError {
    /// True for the only error class that must abort startup.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AdvisorError::LoadTimeInvariantViolation(_))
    }
}
