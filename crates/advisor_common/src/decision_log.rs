//! Routing decision log.
//!
//! Append-only, process-wide observability channel for classifier decisions.
//! Records are written as JSONL and mirrored as tracing events; nothing in
//! the core ever reads this log back.

use crate::types::RoutingDecision;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// One logged routing decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub query: String,
    pub strategy: String,
    pub confidence: f32,
    pub matched_signals: Vec<String>,
    pub rationale: String,
}

impl DecisionRecord {
    pub fn new(session_id: &str, query: &str, decision: &RoutingDecision) -> Self {
        Self {
            timestamp: Utc::now(),
            session_id: session_id.to_string(),
            query: query.to_string(),
            strategy: decision.strategy.as_str().to_string(),
            confidence: decision.confidence,
            matched_signals: decision.matched_signals.clone(),
            rationale: decision.rationale.clone(),
        }
    }
}

/// Append-only JSONL sink. With no path configured, decisions still surface
/// as tracing events.
#[derive(Debug, Default)]
pub struct DecisionLog {
    path: Option<PathBuf>,
}

impl DecisionLog {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// Append one record. Log-write failures are reported and swallowed:
    /// observability must never fail a query.
    pub fn append(&self, record: &DecisionRecord) {
        tracing::info!(
            session = %record.session_id,
            strategy = %record.strategy,
            confidence = record.confidence,
            rationale = %record.rationale,
            "routing decision"
        );

        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = self.append_to_file(path.clone(), record) {
            tracing::warn!(path = %path.display(), error = %e, "decision log write failed");
        }
    }

    fn append_to_file(&self, path: PathBuf, record: &DecisionRecord) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(record)?;
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RoutingStrategy;

    fn decision() -> RoutingDecision {
        RoutingDecision {
            strategy: RoutingStrategy::CodoLookup,
            confidence: 1.0,
            matched_signals: vec!["intent:codo".to_string()],
            rationale: "CODO intent detected".to_string(),
        }
    }

    #[test]
    fn test_append_writes_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decisions.jsonl");
        let log = DecisionLog::new(Some(path.clone()));

        log.append(&DecisionRecord::new("s1", "codo requirements?", &decision()));
        log.append(&DecisionRecord::new("s1", "codo requirements again?", &decision()));

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: DecisionRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.strategy, "codo_lookup");
        assert_eq!(parsed.session_id, "s1");
        assert!((parsed.confidence - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_disabled_log_is_silent() {
        let log = DecisionLog::disabled();
        // Must not panic or create files
        log.append(&DecisionRecord::new("s1", "anything", &decision()));
    }

    #[test]
    fn test_append_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deep/decisions.jsonl");
        let log = DecisionLog::new(Some(path.clone()));
        log.append(&DecisionRecord::new("s2", "q", &decision()));
        assert!(path.exists());
    }
}
