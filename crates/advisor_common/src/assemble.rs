//! Response Assembler.
//!
//! Merges a structured result or a generative fallback into the uniform
//! `AdvisorResponse` record. Structured sources carry the confidence of the
//! producing component; generative text always gets the fixed low-trust
//! constant so downstream consumers can tell grounded from ungrounded
//! answers.

use crate::plan::{CourseStatus, PlanReport};
use crate::reason::EligibilityReport;
use crate::types::{AdvisorResponse, Course, SourceTag, Track};

/// Confidence attached to every generative-fallback answer.
pub const GENERATIVE_CONFIDENCE: f32 = 0.25;

/// Fixed response when neither structured resolution nor the generative
/// collaborator can answer.
pub const UNAVAILABLE_TEXT: &str =
    "I can't answer that confidently right now. Try asking about a specific course, \
     track, or semester plan.";

pub fn from_course(course: &Course, confidence: f32) -> AdvisorResponse {
    let mut text = format!("{} — {}\n{}", course.code, course.title, course.description);
    text.push_str(&format!("\nCredit hours: {}", course.credit_hours));
    if let Some(difficulty) = course.difficulty {
        text.push_str(&format!(" | Difficulty: {difficulty:.1}/5.0"));
    }
    if !course.prerequisites.is_empty() {
        let prereqs: Vec<&str> = course.prerequisites.iter().map(|s| s.as_str()).collect();
        text.push_str(&format!("\nPrerequisites: {}", prereqs.join(", ")));
    }
    AdvisorResponse {
        response_text: text,
        confidence,
        source_tag: SourceTag::CourseLookup,
        matched_track: None,
    }
}

pub fn from_tracks(tracks: &[&Track], confidence: f32) -> AdvisorResponse {
    let mut sections = Vec::new();
    for track in tracks {
        let required: Vec<&str> = track.required_courses.iter().map(|s| s.as_str()).collect();
        let mut section = format!(
            "{} track\nRequired: {}",
            track.name,
            required.join(", ")
        );
        for group in &track.selective_groups {
            let pool: Vec<&str> = group.courses.iter().map(|s| s.as_str()).collect();
            section.push_str(&format!(
                "\n{} (choose {}): {}",
                group.name,
                group.min_count,
                pool.join(", ")
            ));
        }
        sections.push(section);
    }
    AdvisorResponse {
        response_text: sections.join("\n\n"),
        confidence,
        source_tag: SourceTag::TrackLookup,
        matched_track: tracks.first().map(|t| t.name.clone()),
    }
}

pub fn from_codo(requirements: &str, confidence: f32) -> AdvisorResponse {
    AdvisorResponse {
        response_text: requirements.to_string(),
        confidence,
        source_tag: SourceTag::CodoLookup,
        matched_track: None,
    }
}

pub fn from_eligibility(report: &EligibilityReport, confidence: f32) -> AdvisorResponse {
    let mut text = if report.eligible {
        format!("You are eligible to take {}.", report.target)
    } else {
        let missing: Vec<&str> = report.missing.iter().map(|s| s.as_str()).collect();
        format!(
            "You are not yet eligible for {}. Still needed: {}.",
            report.target,
            missing.join(", ")
        )
    };
    if !report.cascade.is_empty() {
        text.push_str(&format!(
            "\nDownstream impact ({} course(s), nearest first): {}.",
            report.cascade.len(),
            report.cascade.join(", ")
        ));
    }
    AdvisorResponse {
        response_text: text,
        confidence,
        source_tag: SourceTag::PrerequisiteReasoner,
        matched_track: None,
    }
}

pub fn from_plan(report: &PlanReport, confidence: f32) -> AdvisorResponse {
    let mut lines = vec![format!(
        "Recommended for {} {}:",
        report.year, report.semester
    )];
    for course in &report.recommended {
        match &course.status {
            CourseStatus::Ready => lines.push(format!("  {} — {}", course.code, course.title)),
            CourseStatus::NeedsPrerequisite { nearest_unmet } => lines.push(format!(
                "  {} — {} (blocked: take {} first)",
                course.code, course.title, nearest_unmet
            )),
        }
    }
    lines.push(report.rationale.clone());
    AdvisorResponse {
        response_text: lines.join("\n"),
        confidence,
        source_tag: SourceTag::ProgressionTemplate,
        matched_track: None,
    }
}

pub fn from_people_search(text: String, confidence: f32) -> AdvisorResponse {
    AdvisorResponse {
        response_text: text,
        confidence,
        source_tag: SourceTag::PeopleSearch,
        matched_track: None,
    }
}

pub fn from_generative(text: String, matched_track: Option<String>) -> AdvisorResponse {
    AdvisorResponse {
        response_text: text,
        confidence: GENERATIVE_CONFIDENCE,
        source_tag: SourceTag::Generative,
        matched_track,
    }
}

/// Structured "don't know" for entities absent from the knowledge base.
pub fn from_not_found(entity: &str) -> AdvisorResponse {
    AdvisorResponse {
        response_text: format!(
            "I don't have {entity} in my knowledge base, so I can't answer that reliably."
        ),
        confidence: 0.0,
        source_tag: SourceTag::Unavailable,
        matched_track: None,
    }
}

/// Degraded answer for `NotFound` and collaborator failures: a valid,
/// low-confidence record, never an error to the caller.
pub fn unavailable(detail: Option<&str>) -> AdvisorResponse {
    let response_text = match detail {
        Some(detail) => format!("{UNAVAILABLE_TEXT}\n({detail})"),
        None => UNAVAILABLE_TEXT.to_string(),
    };
    AdvisorResponse {
        response_text,
        confidence: 0.0,
        source_tag: SourceTag::Unavailable,
        matched_track: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::test_fixtures::sample_kb;
    use crate::reason::PrereqReasoner;
    use std::collections::BTreeSet;

    #[test]
    fn test_course_response_is_grounded() {
        let kb = sample_kb();
        let response = from_course(kb.course("CS 25200").unwrap(), 1.0);
        assert_eq!(response.source_tag, SourceTag::CourseLookup);
        assert!(response.source_tag.is_grounded());
        assert!(response.response_text.contains("CS 25200"));
        assert!(response.response_text.contains("Prerequisites: CS 25000, CS 25100"));
        assert!((response.confidence - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_track_response_names_track() {
        let kb = sample_kb();
        let track = kb.track("machine intelligence").unwrap();
        let response = from_tracks(&[track], 1.0);
        assert_eq!(response.matched_track.as_deref(), Some("Machine Intelligence"));
        assert!(response.response_text.contains("Required:"));
        assert!(response.response_text.contains("choose 1"));
    }

    #[test]
    fn test_eligibility_response_lists_missing() {
        let kb = sample_kb();
        let reasoner = PrereqReasoner::new(&kb);
        let report = reasoner
            .check("CS 25200", &BTreeSet::new(), &BTreeSet::new())
            .unwrap();
        let response = from_eligibility(&report, 0.9);
        assert!(response.response_text.contains("not yet eligible"));
        assert!(response.response_text.contains("CS 25000"));
        assert!(response.response_text.contains("CS 25100"));
        assert_eq!(response.source_tag, SourceTag::PrerequisiteReasoner);
    }

    #[test]
    fn test_generative_response_is_low_trust() {
        let response = from_generative("Maybe try the union food court.".to_string(), None);
        assert_eq!(response.source_tag, SourceTag::Generative);
        assert!(!response.source_tag.is_grounded());
        assert!((response.confidence - GENERATIVE_CONFIDENCE).abs() < f32::EPSILON);
    }

    #[test]
    fn test_unavailable_is_zero_confidence() {
        let response = unavailable(Some("generative backend timed out"));
        assert_eq!(response.source_tag, SourceTag::Unavailable);
        assert_eq!(response.confidence, 0.0);
        assert!(response.response_text.contains("timed out"));
    }
}
