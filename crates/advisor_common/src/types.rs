//! Shared types for the advising core.
//!
//! Catalog records (`Course`, `Track`, `ProgressionTemplate`) are immutable
//! once loaded. Per-query and per-session state lives in `QuerySignals` and
//! `StudentContext`. Absent signals are `None`, never a sentinel string.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ============================================================================
// Catalog records
// ============================================================================

/// A single course as loaded from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Canonical code, department + number ("CS 18000")
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub credit_hours: f32,
    /// Student-reported difficulty, 0.0-5.0
    #[serde(default)]
    pub difficulty: Option<f32>,
    /// Direct prerequisite course codes
    #[serde(default)]
    pub prerequisites: BTreeSet<String>,
    #[serde(default)]
    pub learning_outcomes: Vec<String>,
}

/// A named pool of interchangeable elective courses satisfying one track
/// requirement slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectiveGroup {
    pub name: String,
    pub courses: BTreeSet<String>,
    pub min_count: usize,
}

/// A degree track (e.g. Machine Intelligence, Software Engineering).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub required_courses: BTreeSet<String>,
    #[serde(default)]
    pub selective_groups: Vec<SelectiveGroup>,
}

/// Class year, as detected from query text or stored on a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Year {
    Freshman,
    Sophomore,
    Junior,
    Senior,
}

impl Year {
    pub fn as_str(&self) -> &'static str {
        match self {
            Year::Freshman => "freshman",
            Year::Sophomore => "sophomore",
            Year::Junior => "junior",
            Year::Senior => "senior",
        }
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Academic semester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Semester {
    Fall,
    Spring,
}

impl Semester {
    pub fn as_str(&self) -> &'static str {
        match self {
            Semester::Fall => "fall",
            Semester::Spring => "spring",
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recommended course list for one (year, semester) slot, no deviations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionTemplate {
    pub year: Year,
    pub semester: Semester,
    pub courses: Vec<String>,
}

// ============================================================================
// Per-query signals
// ============================================================================

/// Intent category detected from keyword tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKeyword {
    /// Prerequisite question ("what do I need before...")
    Prerequisite,
    /// Failure / what-if scenario ("what if I fail...")
    WhatIf,
    /// Graduation timeline
    GraduationTimeline,
    /// Track comparison
    TrackComparison,
    /// Course description / definition
    CourseDescription,
    /// CODO (change of degree objective) requirements
    Codo,
    /// Career networking / alumni lookup
    PeopleSearch,
}

impl IntentKeyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKeyword::Prerequisite => "prerequisite",
            IntentKeyword::WhatIf => "what_if",
            IntentKeyword::GraduationTimeline => "graduation_timeline",
            IntentKeyword::TrackComparison => "track_comparison",
            IntentKeyword::CourseDescription => "course_description",
            IntentKeyword::Codo => "codo",
            IntentKeyword::PeopleSearch => "people_search",
        }
    }
}

/// Entities extracted for the people/career-search collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeopleEntities {
    pub institution: Option<String>,
    pub major: Option<String>,
    pub employer: Option<String>,
}

/// Structured signals derived from one raw query.
///
/// Course codes are already normalized; whether they resolve against the
/// knowledge base is the classifier's concern, not the extractor's.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuerySignals {
    pub year: Option<Year>,
    pub semester: Option<Semester>,
    /// Normalized course mentions, in scan order, deduplicated
    pub courses: Vec<String>,
    /// Known track names mentioned, in scan order
    pub tracks: Vec<String>,
    pub intents: BTreeSet<IntentKeyword>,
    /// Courses the student states they completed ("I passed CS 18000")
    pub completed_statements: BTreeSet<String>,
    /// Courses the student states they failed
    pub failed_statements: BTreeSet<String>,
    pub people_entities: PeopleEntities,
}

impl QuerySignals {
    pub fn has_intent(&self, intent: IntentKeyword) -> bool {
        self.intents.contains(&intent)
    }

    /// Flat list of matched-signal labels for decision records.
    pub fn matched_labels(&self) -> Vec<String> {
        let mut labels = Vec::new();
        if let Some(year) = self.year {
            labels.push(format!("year:{year}"));
        }
        if let Some(semester) = self.semester {
            labels.push(format!("semester:{semester}"));
        }
        for code in &self.courses {
            labels.push(format!("course:{code}"));
        }
        for track in &self.tracks {
            labels.push(format!("track:{track}"));
        }
        for intent in &self.intents {
            labels.push(format!("intent:{}", intent.as_str()));
        }
        labels
    }
}

// ============================================================================
// Session state
// ============================================================================

/// Per-session student state, owned by the session store and passed
/// explicitly into every call. Never persisted beyond the session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentContext {
    pub completed: BTreeSet<String>,
    pub failed: BTreeSet<String>,
    pub year: Option<Year>,
    pub semester: Option<Semester>,
    pub tracks: Vec<String>,
}

impl StudentContext {
    /// Fold one query's signals into the session.
    ///
    /// Completed/failed statements accumulate; a failed course cannot also
    /// count as completed. Year/semester/track detections overwrite earlier
    /// ones (the student's latest self-description wins across queries).
    pub fn absorb(&mut self, signals: &QuerySignals) {
        for code in &signals.completed_statements {
            self.failed.remove(code);
            self.completed.insert(code.clone());
        }
        for code in &signals.failed_statements {
            self.completed.remove(code);
            self.failed.insert(code.clone());
        }
        if signals.year.is_some() {
            self.year = signals.year;
        }
        if signals.semester.is_some() {
            self.semester = signals.semester;
        }
        for track in &signals.tracks {
            if !self.tracks.contains(track) {
                self.tracks.push(track.clone());
            }
        }
    }
}

// ============================================================================
// Routing
// ============================================================================

/// Resolution strategy chosen by the classifier. Tagged variants carry the
/// payload the dispatching engine needs; no runtime type inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum RoutingStrategy {
    /// Serve a single course record verbatim from the knowledge base
    CourseLookup { code: String },
    /// Serve one or more track records verbatim
    TrackLookup { tracks: Vec<String> },
    /// Serve the CODO requirements entity verbatim
    CodoLookup,
    /// Prerequisite / what-if reasoning over the graph
    PrerequisiteReasoner { target: String },
    /// Degree-progression template planning
    ProgressionPlanner { year: Year, semester: Semester },
    /// Forward to the career people-search collaborator
    PeopleSearch { entities: PeopleEntities },
    /// No structured strategy applies
    GenerativeFallback,
}

impl RoutingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingStrategy::CourseLookup { .. } => "course_lookup",
            RoutingStrategy::TrackLookup { .. } => "track_lookup",
            RoutingStrategy::CodoLookup => "codo_lookup",
            RoutingStrategy::PrerequisiteReasoner { .. } => "prerequisite_reasoner",
            RoutingStrategy::ProgressionPlanner { .. } => "progression_planner",
            RoutingStrategy::PeopleSearch { .. } => "people_search",
            RoutingStrategy::GenerativeFallback => "generative_fallback",
        }
    }
}

/// The classifier's output: strategy, confidence, and an explanation.
/// Every decision must be explainable after the fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingDecision {
    #[serde(flatten)]
    pub strategy: RoutingStrategy,
    /// 0.0 - 1.0
    pub confidence: f32,
    pub matched_signals: Vec<String>,
    pub rationale: String,
}

// ============================================================================
// Final response
// ============================================================================

/// Where the answer text came from. Lets downstream consumers distinguish
/// grounded answers from ungrounded ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    CourseLookup,
    TrackLookup,
    CodoLookup,
    PrerequisiteReasoner,
    ProgressionTemplate,
    PeopleSearch,
    Generative,
    Unavailable,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::CourseLookup => "course_lookup",
            SourceTag::TrackLookup => "track_lookup",
            SourceTag::CodoLookup => "codo_lookup",
            SourceTag::PrerequisiteReasoner => "prerequisite_reasoner",
            SourceTag::ProgressionTemplate => "progression_template",
            SourceTag::PeopleSearch => "people_search",
            SourceTag::Generative => "generative",
            SourceTag::Unavailable => "unavailable",
        }
    }

    /// Grounded answers come verbatim from the knowledge base or from
    /// deterministic reasoning over it.
    pub fn is_grounded(&self) -> bool {
        !matches!(self, SourceTag::Generative | SourceTag::Unavailable)
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform result record returned by `process_query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorResponse {
    pub response_text: String,
    pub confidence: f32,
    pub source_tag: SourceTag,
    pub matched_track: Option<String>,
}
