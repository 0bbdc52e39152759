//! Advisor engine - the query entry point.
//!
//! `process_query(session_id, text)` is the sole externally observable
//! operation of the core: extract signals, absorb them into the session,
//! classify, dispatch to the chosen resolver, assemble. Every per-query
//! error is converted into a valid low-confidence response here; nothing
//! escapes as an unhandled fault.

use crate::assemble;
use crate::classify::Classifier;
use crate::decision_log::DecisionLog;
use crate::error::AdvisorError;
use crate::extract::SignalExtractor;
use crate::generative::GenerativeClient;
use crate::knowledge::KnowledgeBase;
use crate::people::PeopleSearchClient;
use crate::plan::ProgressionPlanner;
use crate::reason::PrereqReasoner;
use crate::session::SessionStore;
use crate::types::{
    AdvisorResponse, IntentKeyword, QuerySignals, RoutingStrategy, StudentContext,
};
use std::collections::BTreeSet;

pub struct AdvisorEngine {
    kb: KnowledgeBase,
    sessions: SessionStore,
    generative: Box<dyn GenerativeClient>,
    people: Box<dyn PeopleSearchClient>,
    decision_log: DecisionLog,
}

impl AdvisorEngine {
    /// The knowledge base must already be loaded and validated; there is no
    /// per-query recovery from bad catalog data.
    pub fn new(
        kb: KnowledgeBase,
        generative: Box<dyn GenerativeClient>,
        people: Box<dyn PeopleSearchClient>,
        decision_log: DecisionLog,
    ) -> Self {
        Self {
            kb,
            sessions: SessionStore::new(),
            generative,
            people,
            decision_log,
        }
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Resolve one query synchronously, start to finish.
    pub fn process_query(&mut self, session_id: &str, text: &str) -> AdvisorResponse {
        tracing::info!(session = session_id, query = text, "processing query");

        let signals = SignalExtractor::new(&self.kb).extract(text);

        let student = {
            let ctx = self.sessions.get_or_create(session_id);
            ctx.absorb(&signals);
            ctx.clone()
        };

        let decision =
            Classifier::new(&self.kb).classify(session_id, text, &signals, &self.decision_log);

        let response = self.dispatch(&decision.strategy, decision.confidence, text, &signals, &student);

        tracing::info!(
            session = session_id,
            source = %response.source_tag,
            confidence = response.confidence,
            "query resolved"
        );
        response
    }

    fn dispatch(
        &self,
        strategy: &RoutingStrategy,
        confidence: f32,
        text: &str,
        signals: &QuerySignals,
        student: &StudentContext,
    ) -> AdvisorResponse {
        match strategy {
            RoutingStrategy::CourseLookup { code } => match self.kb.course(code) {
                Some(course) => assemble::from_course(course, confidence),
                None => assemble::from_not_found(&format!("course {code}")),
            },

            RoutingStrategy::TrackLookup { tracks } => {
                let found: Vec<_> = tracks.iter().filter_map(|name| self.kb.track(name)).collect();
                if found.is_empty() {
                    assemble::from_not_found("that track")
                } else {
                    assemble::from_tracks(&found, confidence)
                }
            }

            RoutingStrategy::CodoLookup => match self.kb.codo_requirements() {
                Some(requirements) => assemble::from_codo(requirements, confidence),
                None => assemble::from_not_found("CODO requirements"),
            },

            RoutingStrategy::PrerequisiteReasoner { target } => {
                // A what-if question treats the target as hypothetically
                // failed on top of the session's actual record.
                let mut failed: BTreeSet<String> = student.failed.clone();
                if signals.has_intent(IntentKeyword::WhatIf) {
                    failed.insert(target.clone());
                }
                match PrereqReasoner::new(&self.kb).check(target, &student.completed, &failed) {
                    Ok(report) => assemble::from_eligibility(&report, confidence),
                    Err(AdvisorError::NotFound(entity)) => assemble::from_not_found(&entity),
                    Err(e) => {
                        tracing::warn!(error = %e, "reasoner failed");
                        assemble::unavailable(None)
                    }
                }
            }

            RoutingStrategy::ProgressionPlanner { year, semester } => {
                match ProgressionPlanner::new(&self.kb).recommend(*year, *semester, student) {
                    Ok(report) => assemble::from_plan(&report, confidence),
                    Err(AdvisorError::NotFound(entity)) => assemble::from_not_found(&entity),
                    Err(e) => {
                        tracing::warn!(error = %e, "planner failed");
                        assemble::unavailable(None)
                    }
                }
            }

            RoutingStrategy::PeopleSearch { entities } => {
                match self.people.search(text, entities) {
                    Ok(answer) => assemble::from_people_search(answer, confidence),
                    Err(e) => {
                        tracing::warn!(error = %e, "people-search collaborator unavailable");
                        assemble::unavailable(Some("career search service unreachable"))
                    }
                }
            }

            RoutingStrategy::GenerativeFallback => match self.generative.ask(text, signals) {
                Ok(answer) => {
                    assemble::from_generative(answer, signals.tracks.first().cloned())
                }
                Err(e) => {
                    tracing::warn!(error = %e, "generative collaborator unavailable");
                    assemble::unavailable(Some("generative backend unreachable"))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generative::StaticGenerativeClient;
    use crate::knowledge::test_fixtures::sample_kb;
    use crate::people::StaticPeopleSearchClient;
    use crate::types::SourceTag;

    fn engine() -> AdvisorEngine {
        AdvisorEngine::new(
            sample_kb(),
            Box::new(StaticGenerativeClient::answering("generative says hi")),
            Box::new(StaticPeopleSearchClient::answering("1 alumnus found")),
            DecisionLog::disabled(),
        )
    }

    #[test]
    fn test_course_lookup_end_to_end() {
        let mut engine = engine();
        let response = engine.process_query("s1", "What is CS 18000 about?");
        assert_eq!(response.source_tag, SourceTag::CourseLookup);
        assert!(response.response_text.contains("CS 18000"));
        assert!((response.confidence - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_session_accumulation_changes_reasoning() {
        let mut engine = engine();

        let before = engine.process_query("s1", "What are the prerequisites for CS 18200?");
        assert!(before.response_text.contains("not yet eligible"));

        engine.process_query("s1", "I passed CS 18000 by the way");

        let after = engine.process_query("s1", "Am I eligible for CS 18200 now?");
        assert_eq!(after.source_tag, SourceTag::PrerequisiteReasoner);
        assert!(after.response_text.contains("eligible to take CS 18200"));
    }

    #[test]
    fn test_sessions_do_not_leak_between_ids() {
        let mut engine = engine();
        engine.process_query("alice", "I passed CS 18000");
        let bob = engine.process_query("bob", "Am I eligible for CS 18200?");
        assert!(bob.response_text.contains("not yet eligible"));
    }

    #[test]
    fn test_what_if_failure_cascade() {
        let mut engine = engine();
        let response = engine.process_query("s1", "What if I fail CS 18000?");
        assert_eq!(response.source_tag, SourceTag::PrerequisiteReasoner);
        assert!(response.response_text.contains("CS 18200"));
        assert!(response.response_text.contains("CS 24000"));
    }

    #[test]
    fn test_unknown_course_is_structured_dont_know() {
        let mut engine = engine();
        let response = engine.process_query("s1", "What are the prerequisites for CS 99999?");
        assert_eq!(response.source_tag, SourceTag::Unavailable);
        assert!(response.response_text.contains("CS 99999"));
        assert_eq!(response.confidence, 0.0);
    }

    #[test]
    fn test_missing_template_is_defined_outcome() {
        let mut engine = engine();
        let response = engine.process_query("s1", "What should a senior take in spring semester?");
        assert_eq!(response.source_tag, SourceTag::Unavailable);
        assert!(response.response_text.contains("progression template"));
    }

    #[test]
    fn test_generative_fallback_path() {
        let mut engine = engine();
        let response = engine.process_query("s1", "What's the best pizza place near campus?");
        assert_eq!(response.source_tag, SourceTag::Generative);
        assert_eq!(response.response_text, "generative says hi");
        assert!(response.confidence < 0.5);
    }

    #[test]
    fn test_generative_failure_degrades_gracefully() {
        let mut engine = AdvisorEngine::new(
            sample_kb(),
            Box::new(StaticGenerativeClient::unavailable()),
            Box::new(StaticPeopleSearchClient::unavailable()),
            DecisionLog::disabled(),
        );
        let response = engine.process_query("s1", "What's the best pizza place near campus?");
        assert_eq!(response.source_tag, SourceTag::Unavailable);
        assert_eq!(response.confidence, 0.0);
    }

    #[test]
    fn test_people_search_forwarded() {
        let mut engine = engine();
        let response = engine.process_query("s1", "Find alumni working at Google");
        assert_eq!(response.source_tag, SourceTag::PeopleSearch);
        assert!(response.response_text.contains("alumnus"));
    }

    #[test]
    fn test_people_search_failure_degrades() {
        let mut engine = AdvisorEngine::new(
            sample_kb(),
            Box::new(StaticGenerativeClient::answering("x")),
            Box::new(StaticPeopleSearchClient::unavailable()),
            DecisionLog::disabled(),
        );
        let response = engine.process_query("s1", "Find alumni working at Google");
        assert_eq!(response.source_tag, SourceTag::Unavailable);
    }

    #[test]
    fn test_codo_lookup_served_verbatim() {
        let mut engine = engine();
        let response = engine.process_query("s1", "What are the CODO requirements?");
        assert_eq!(response.source_tag, SourceTag::CodoLookup);
        assert!(response.response_text.contains("CODO"));
    }
}
