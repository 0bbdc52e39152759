//! Query Classifier / Router.
//!
//! Maps an extracted signal bundle to a resolution strategy through an
//! ordered table of (predicate, strategy) rules evaluated in fixed priority
//! order; the first applicable rule wins. Priority encodes "most specific,
//! most trustworthy data source first". Every decision is appended to the
//! one-way decision log with its matched signals and rationale.

use crate::decision_log::{DecisionLog, DecisionRecord};
use crate::knowledge::KnowledgeBase;
use crate::types::{IntentKeyword, QuerySignals, RoutingDecision, RoutingStrategy};

/// Decisions below this confidence are rerouted to the generative fallback.
pub const STRUCTURED_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Confidence assigned to answers served verbatim from the knowledge base.
pub const CONFIDENCE_DIRECT: f32 = 1.0;
/// Confidence assigned to graph reasoning over validated data.
pub const CONFIDENCE_REASONER: f32 = 0.9;
/// Confidence assigned to template planning.
pub const CONFIDENCE_PLANNER: f32 = 0.85;
/// Confidence assigned to a recognized people-search forward.
pub const CONFIDENCE_PEOPLE: f32 = 0.8;
/// Confidence carried by a fallback routing decision.
pub const CONFIDENCE_FALLBACK: f32 = 0.25;

/// Inputs one rule predicate sees.
struct RuleCtx<'c> {
    signals: &'c QuerySignals,
    /// Mentioned courses that actually resolve against the knowledge base
    resolved: Vec<String>,
}

type Rule = fn(&Classifier<'_>, &RuleCtx<'_>) -> Option<RoutingDecision>;

/// Fixed-priority routing table. Order is the contract.
static RULES: &[(&str, Rule)] = &[
    ("people_search", |c, ctx| c.rule_people_search(ctx)),
    ("course_lookup", |c, ctx| c.rule_course_lookup(ctx)),
    ("track_lookup", |c, ctx| c.rule_track_lookup(ctx)),
    ("codo_lookup", |c, ctx| c.rule_codo_lookup(ctx)),
    ("prerequisite_reasoner", |c, ctx| c.rule_prerequisite(ctx)),
    ("progression_planner", |c, ctx| c.rule_progression(ctx)),
];

pub struct Classifier<'a> {
    kb: &'a KnowledgeBase,
}

impl<'a> Classifier<'a> {
    pub fn new(kb: &'a KnowledgeBase) -> Self {
        Self { kb }
    }

    /// Route one query. Deterministic: identical signals and knowledge base
    /// state always produce the same decision. The decision is appended to
    /// `log` before being returned; the classifier never reads the log.
    pub fn classify(
        &self,
        session_id: &str,
        query: &str,
        signals: &QuerySignals,
        log: &DecisionLog,
    ) -> RoutingDecision {
        let ctx = RuleCtx {
            signals,
            resolved: signals
                .courses
                .iter()
                .filter(|code| self.kb.has_course(code))
                .cloned()
                .collect(),
        };

        let mut decision = None;
        for (name, rule) in RULES {
            if let Some(hit) = rule(self, &ctx) {
                tracing::debug!(rule = name, "routing rule matched");
                decision = Some(hit);
                break;
            }
        }
        let mut decision = decision.unwrap_or_else(|| self.fallback(&ctx));

        if decision.confidence < STRUCTURED_CONFIDENCE_THRESHOLD
            && decision.strategy != RoutingStrategy::GenerativeFallback
        {
            decision = RoutingDecision {
                rationale: format!(
                    "confidence {:.2} below structured threshold; degraded to generative fallback \
                     (was: {})",
                    decision.confidence, decision.rationale
                ),
                strategy: RoutingStrategy::GenerativeFallback,
                confidence: CONFIDENCE_FALLBACK,
                matched_signals: decision.matched_signals,
            };
        }

        log.append(&DecisionRecord::new(session_id, query, &decision));
        decision
    }

    // ------------------------------------------------------------------
    // Rules, in table order
    // ------------------------------------------------------------------

    /// Career networking questions go to a separate lookup service.
    fn rule_people_search(&self, ctx: &RuleCtx<'_>) -> Option<RoutingDecision> {
        if !ctx.signals.has_intent(IntentKeyword::PeopleSearch) {
            return None;
        }
        Some(RoutingDecision {
            strategy: RoutingStrategy::PeopleSearch {
                entities: ctx.signals.people_entities.clone(),
            },
            confidence: CONFIDENCE_PEOPLE,
            matched_signals: ctx.signals.matched_labels(),
            rationale: "career/people-search keywords detected; forwarding to lookup service"
                .to_string(),
        })
    }

    /// A single resolved course with a description/definition intent is
    /// served verbatim. Prerequisite and what-if phrasing outranks this:
    /// "what is the prerequisite for X" is a graph question.
    fn rule_course_lookup(&self, ctx: &RuleCtx<'_>) -> Option<RoutingDecision> {
        if ctx.resolved.len() != 1
            || !ctx.signals.has_intent(IntentKeyword::CourseDescription)
            || ctx.signals.has_intent(IntentKeyword::Prerequisite)
            || ctx.signals.has_intent(IntentKeyword::WhatIf)
        {
            return None;
        }
        let code = ctx.resolved[0].clone();
        Some(RoutingDecision {
            strategy: RoutingStrategy::CourseLookup { code: code.clone() },
            confidence: CONFIDENCE_DIRECT,
            matched_signals: ctx.signals.matched_labels(),
            rationale: format!("single known course {code} with description intent"),
        })
    }

    /// Named tracks are served verbatim unless the query is really a
    /// progression question (year and semester present, nothing naming the
    /// track as the subject).
    fn rule_track_lookup(&self, ctx: &RuleCtx<'_>) -> Option<RoutingDecision> {
        if ctx.signals.tracks.is_empty() || !ctx.resolved.is_empty() {
            return None;
        }
        let entity_intent = ctx.signals.has_intent(IntentKeyword::TrackComparison)
            || ctx.signals.has_intent(IntentKeyword::CourseDescription);
        let progression_shaped =
            ctx.signals.year.is_some() && ctx.signals.semester.is_some() && !entity_intent;
        if progression_shaped {
            return None;
        }
        Some(RoutingDecision {
            strategy: RoutingStrategy::TrackLookup {
                tracks: ctx.signals.tracks.clone(),
            },
            confidence: CONFIDENCE_DIRECT,
            matched_signals: ctx.signals.matched_labels(),
            rationale: format!("known track(s) named: {}", ctx.signals.tracks.join(", ")),
        })
    }

    fn rule_codo_lookup(&self, ctx: &RuleCtx<'_>) -> Option<RoutingDecision> {
        if !ctx.signals.has_intent(IntentKeyword::Codo) {
            return None;
        }
        Some(RoutingDecision {
            strategy: RoutingStrategy::CodoLookup,
            confidence: CONFIDENCE_DIRECT,
            matched_signals: ctx.signals.matched_labels(),
            rationale: "CODO requirements intent detected".to_string(),
        })
    }

    /// Prerequisite or what-if phrasing with at least one course that
    /// resolves against the catalog.
    fn rule_prerequisite(&self, ctx: &RuleCtx<'_>) -> Option<RoutingDecision> {
        let keyword = ctx.signals.has_intent(IntentKeyword::Prerequisite)
            || ctx.signals.has_intent(IntentKeyword::WhatIf);
        if !keyword {
            return None;
        }
        // An unresolved mention ("CS 99999") still routes here so the
        // reasoner can answer "not found" instead of hallucinating.
        let target = ctx
            .resolved
            .first()
            .or_else(|| ctx.signals.courses.first())?
            .clone();
        Some(RoutingDecision {
            strategy: RoutingStrategy::PrerequisiteReasoner { target: target.clone() },
            confidence: CONFIDENCE_REASONER,
            matched_signals: ctx.signals.matched_labels(),
            rationale: format!("prerequisite/what-if phrasing with course {target}"),
        })
    }

    /// Year and semester both known and nothing prerequisite-shaped.
    fn rule_progression(&self, ctx: &RuleCtx<'_>) -> Option<RoutingDecision> {
        if ctx.signals.has_intent(IntentKeyword::Prerequisite)
            || ctx.signals.has_intent(IntentKeyword::WhatIf)
        {
            return None;
        }
        let (year, semester) = (ctx.signals.year?, ctx.signals.semester?);
        Some(RoutingDecision {
            strategy: RoutingStrategy::ProgressionPlanner { year, semester },
            confidence: CONFIDENCE_PLANNER,
            matched_signals: ctx.signals.matched_labels(),
            rationale: format!("year ({year}) and semester ({semester}) both detected"),
        })
    }

    fn fallback(&self, ctx: &RuleCtx<'_>) -> RoutingDecision {
        RoutingDecision {
            strategy: RoutingStrategy::GenerativeFallback,
            confidence: CONFIDENCE_FALLBACK,
            matched_signals: ctx.signals.matched_labels(),
            rationale: "no structured rule applicable; deferring to generative fallback"
                .to_string(),
        }
    }
}
