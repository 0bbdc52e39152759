//! Query Signal Extractor.
//!
//! Derives structured signals from free text: student year, semester,
//! mentioned course codes (through the normalizer), mentioned track names,
//! and intent keywords. Detection is keyword/phrase based with explicit
//! synonym tables. Absent or undetectable signals stay `None`; conflicting
//! detections for one field resolve by first-match-in-scan-order, and the
//! conflict is logged.

use crate::knowledge::KnowledgeBase;
use crate::normalize::CourseNormalizer;
use crate::types::{IntentKeyword, PeopleEntities, QuerySignals, Semester, Year};
use once_cell::sync::Lazy;
use regex::Regex;

// ============================================================================
// Synonym and keyword tables
// ============================================================================

static YEAR_SYNONYMS: &[(Year, &[&str])] = &[
    (Year::Freshman, &["freshman", "freshmen", "first year", "first-year", "1st year"]),
    (Year::Sophomore, &["sophomore", "second year", "second-year", "2nd year"]),
    (Year::Junior, &["junior", "third year", "third-year", "3rd year"]),
    (Year::Senior, &["senior", "fourth year", "fourth-year", "4th year", "final year"]),
];

static SEMESTER_SYNONYMS: &[(Semester, &[&str])] = &[
    (Semester::Fall, &["fall", "autumn"]),
    (Semester::Spring, &["spring"]),
];

static PREREQ_PHRASES: &[&str] = &[
    "prerequisite",
    "prerequisites",
    "prereq",
    "prereqs",
    "before i can take",
    "before taking",
    "required for",
    "requirements for",
    "need to take before",
    "what do i need for",
    "am i eligible",
    "eligible for",
];

static WHATIF_PHRASES: &[&str] = &[
    "what if i fail",
    "if i fail",
    "what if i failed",
    "if i failed",
    "what happens if",
    "what if i don't pass",
    "what if i dont pass",
    "retake",
];

static GRADUATION_PHRASES: &[&str] = &[
    "graduate on time",
    "graduation",
    "graduate in",
    "how long until i graduate",
    "finish my degree",
    "degree timeline",
    "years left",
];

static COMPARISON_PHRASES: &[&str] = &[
    "compare",
    "comparison",
    "versus",
    " vs ",
    " vs.",
    "difference between",
    "differences between",
    "which track",
    "better track",
    "or the",
];

static DESCRIPTION_PHRASES: &[&str] = &[
    "what is",
    "what's",
    "whats",
    "describe",
    "description",
    "tell me about",
    "about the course",
    "what does",
    "cover",
];

static CODO_PHRASES: &[&str] = &[
    "codo",
    "change of degree",
    "change my major",
    "change majors",
    "switch my major",
    "switch majors",
    "transfer into",
];

static PEOPLE_PHRASES: &[&str] = &[
    "alumni",
    "alumnus",
    "alumna",
    "works at",
    "working at",
    "work at",
    "employed at",
    "who works",
    "find someone",
    "networking",
    "connect with",
    "people at",
];

static PASSED_PHRASES: &[&str] = &[
    "i passed",
    "i've passed",
    "i have passed",
    "i completed",
    "i've completed",
    "i have completed",
    "i took",
    "i've taken",
    "i have taken",
    "already taken",
    "already took",
    "already passed",
];

static FAILED_PHRASES: &[&str] = &[
    "i failed",
    "i've failed",
    "i have failed",
    "i am failing",
    "i'm failing",
];

/// Course mentions inside running text: a letter block followed by 3-5
/// digits ("CS 180", "cs18000", "compsci 182").
static MENTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Za-z]{2,20})\s*([0-9]{3,5})\b").expect("valid regex"));

static EMPLOYER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:works at|working at|work at|employed at|people at|alumni at)\s+([A-Za-z0-9&.\-]+(?:\s+[A-Za-z0-9&.\-]+){0,3})")
        .expect("valid regex")
});

static INSTITUTION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:graduated from|alumni of|alumnus of|alumna of|studied at)\s+([A-Za-z.\-]+(?:\s+[A-Za-z.\-]+){0,3})")
        .expect("valid regex")
});

static MAJOR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:majored in|major in|degree in)\s+([A-Za-z]+(?:\s+[A-Za-z]+){0,2})")
        .expect("valid regex")
});

// ============================================================================
// Extractor
// ============================================================================

/// Turns one raw query into a `QuerySignals` bundle. Stateless; all state
/// lives in the knowledge base it scans against.
pub struct SignalExtractor<'a> {
    kb: &'a KnowledgeBase,
    normalizer: CourseNormalizer<'a>,
}

impl<'a> SignalExtractor<'a> {
    pub fn new(kb: &'a KnowledgeBase) -> Self {
        Self {
            kb,
            normalizer: CourseNormalizer::new(kb),
        }
    }

    pub fn extract(&self, query: &str) -> QuerySignals {
        let lower = query.to_lowercase();

        let mut signals = QuerySignals {
            year: scan_synonyms(&lower, YEAR_SYNONYMS, "year"),
            semester: scan_synonyms(&lower, SEMESTER_SYNONYMS, "semester"),
            courses: self.scan_courses(query),
            tracks: self.scan_tracks(&lower),
            ..Default::default()
        };

        for (intent, phrases) in [
            (IntentKeyword::Prerequisite, PREREQ_PHRASES),
            (IntentKeyword::WhatIf, WHATIF_PHRASES),
            (IntentKeyword::GraduationTimeline, GRADUATION_PHRASES),
            (IntentKeyword::TrackComparison, COMPARISON_PHRASES),
            (IntentKeyword::CourseDescription, DESCRIPTION_PHRASES),
            (IntentKeyword::Codo, CODO_PHRASES),
            (IntentKeyword::PeopleSearch, PEOPLE_PHRASES),
        ] {
            if phrases.iter().any(|p| find_phrase(&lower, p).is_some()) {
                signals.intents.insert(intent);
            }
        }

        // "what if I fail X" is a hypothesis, not a transcript statement:
        // the what-if intent suppresses failure accumulation for this query.
        if contains_any_phrase(&lower, PASSED_PHRASES) {
            signals.completed_statements = signals.courses.iter().cloned().collect();
        } else if !signals.has_intent(IntentKeyword::WhatIf)
            && contains_any_phrase(&lower, FAILED_PHRASES)
        {
            signals.failed_statements = signals.courses.iter().cloned().collect();
        }

        if signals.has_intent(IntentKeyword::PeopleSearch) {
            signals.people_entities = self.scan_people_entities(query);
        }

        tracing::debug!(
            year = ?signals.year,
            semester = ?signals.semester,
            courses = ?signals.courses,
            tracks = ?signals.tracks,
            intents = ?signals.intents,
            "signals extracted"
        );

        signals
    }

    /// Course mentions in scan order, normalized, deduplicated. A mention is
    /// kept only when its department prefix is known to the catalog, so
    /// "fall 2024" never becomes a phantom course; an unknown number in a
    /// known department ("CS 99999") is kept for the reasoner to report as
    /// not found.
    fn scan_courses(&self, query: &str) -> Vec<String> {
        let mut courses = Vec::new();
        for caps in MENTION_PATTERN.captures_iter(query) {
            let mention = format!("{} {}", &caps[1], &caps[2]);
            let normalized = self.normalizer.normalize(&mention);
            let known_dept = normalized
                .split_once(' ')
                .map(|(dept, _)| self.kb.dept_width(dept).is_some())
                .unwrap_or(false);
            if known_dept && !courses.contains(&normalized) {
                courses.push(normalized);
            }
        }
        courses
    }

    /// Known track names mentioned in the query, in scan order.
    fn scan_tracks(&self, lower: &str) -> Vec<String> {
        let mut found: Vec<(usize, String)> = Vec::new();
        for name in self.kb.track_names() {
            if let Some(pos) = find_phrase(lower, &name.to_lowercase()) {
                found.push((pos, name.to_string()));
            }
        }
        found.sort();
        found.into_iter().map(|(_, name)| name).collect()
    }

    fn scan_people_entities(&self, query: &str) -> PeopleEntities {
        PeopleEntities {
            institution: capture_trimmed(&INSTITUTION_PATTERN, query),
            major: capture_trimmed(&MAJOR_PATTERN, query),
            employer: capture_trimmed(&EMPLOYER_PATTERN, query),
        }
    }
}

// ============================================================================
// Scanning helpers
// ============================================================================

/// Earliest-occurrence scan over a synonym table. When two different values
/// both match, the first one in scan order wins and the conflict is logged
/// as an ambiguous signal.
fn scan_synonyms<T: Copy + std::fmt::Debug + PartialEq>(
    lower: &str,
    table: &[(T, &[&str])],
    field: &str,
) -> Option<T> {
    let mut best: Option<(usize, T)> = None;
    let mut matched_values: Vec<T> = Vec::new();

    for (value, synonyms) in table {
        let earliest = synonyms
            .iter()
            .filter_map(|syn| find_phrase(lower, syn))
            .min();
        if let Some(pos) = earliest {
            matched_values.push(*value);
            if best.map(|(best_pos, _)| pos < best_pos).unwrap_or(true) {
                best = Some((pos, *value));
            }
        }
    }

    if matched_values.len() > 1 {
        tracing::warn!(
            field,
            candidates = ?matched_values,
            winner = ?best.map(|(_, v)| v),
            "ambiguous signal resolved by first match in scan order"
        );
    }

    best.map(|(_, value)| value)
}

/// Find `phrase` in `text` at word boundaries; returns the byte offset of
/// the first occurrence. Plain `contains` would let "fall" hide inside
/// "pitfall".
fn find_phrase(text: &str, phrase: &str) -> Option<usize> {
    let mut start = 0;
    while let Some(rel) = text[start..].find(phrase) {
        let pos = start + rel;
        let end = pos + phrase.len();
        let ok_before = pos == 0
            || !text[..pos]
                .chars()
                .next_back()
                .map(char::is_alphanumeric)
                .unwrap_or(false);
        let ok_after = end == text.len()
            || !text[end..]
                .chars()
                .next()
                .map(char::is_alphanumeric)
                .unwrap_or(false);
        if ok_before && ok_after {
            return Some(pos);
        }
        start = pos + phrase.len().max(1);
    }
    None
}

fn contains_any_phrase(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| find_phrase(text, p).is_some())
}

/// Words that end an entity capture ("Google with a degree in..." -> "Google").
static ENTITY_STOP_WORDS: &[&str] = &["who", "with", "that", "from", "in", "and", "or", "for"];

fn capture_trimmed(pattern: &Regex, text: &str) -> Option<String> {
    let caps = pattern.captures(text)?;
    let raw = caps[1].trim_end_matches(['?', '.', ',', '!']).trim();
    let mut kept: Vec<&str> = Vec::new();
    for word in raw.split_whitespace() {
        if ENTITY_STOP_WORDS.contains(&word.to_lowercase().as_str()) {
            break;
        }
        kept.push(word);
    }
    if kept.is_empty() {
        None
    } else {
        Some(kept.join(" "))
    }
}
