//! Degree Progression Planner.
//!
//! Direct keyed access into the progression templates, adjusted for the
//! student's record: completed courses drop out, courses with unsatisfied
//! prerequisites are flagged and paired with the nearest unmet prerequisite
//! as a remediation suggestion. A missing (year, semester) template is a
//! defined "no recommendation available" outcome.

use crate::error::AdvisorError;
use crate::knowledge::KnowledgeBase;
use crate::reason::PrereqReasoner;
use crate::types::{Semester, StudentContext, Year};
use serde::{Deserialize, Serialize};

/// Whether a template course is ready to take this semester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CourseStatus {
    /// Prerequisites satisfied, recommend as-is
    Ready,
    /// Prerequisites not satisfied; take the suggested course first
    NeedsPrerequisite { nearest_unmet: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedCourse {
    pub code: String,
    pub title: String,
    #[serde(flatten)]
    pub status: CourseStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReport {
    pub year: Year,
    pub semester: Semester,
    pub recommended: Vec<PlannedCourse>,
    pub rationale: String,
}

pub struct ProgressionPlanner<'a> {
    kb: &'a KnowledgeBase,
    reasoner: PrereqReasoner<'a>,
}

impl<'a> ProgressionPlanner<'a> {
    pub fn new(kb: &'a KnowledgeBase) -> Self {
        Self {
            kb,
            reasoner: PrereqReasoner::new(kb),
        }
    }

    /// Recommend this semester's courses for the student. `NotFound` when no
    /// template exists for the (year, semester) pair.
    pub fn recommend(
        &self,
        year: Year,
        semester: Semester,
        student: &StudentContext,
    ) -> Result<PlanReport, AdvisorError> {
        let template = self.kb.template(year, semester).ok_or_else(|| {
            AdvisorError::NotFound(format!("progression template for {year} {semester}"))
        })?;

        let mut recommended = Vec::new();
        let mut flagged = 0usize;
        let mut skipped = 0usize;

        for code in template {
            if student.completed.contains(code) {
                skipped += 1;
                continue;
            }
            let title = self
                .kb
                .course(code)
                .map(|c| c.title.clone())
                .unwrap_or_default();

            let report = self.reasoner.check(code, &student.completed, &student.failed)?;
            let status = if report.eligible {
                CourseStatus::Ready
            } else {
                flagged += 1;
                let nearest = self
                    .reasoner
                    .nearest_unmet_prerequisite(code, &student.completed)
                    .unwrap_or_else(|| {
                        report.missing.iter().next().cloned().unwrap_or_default()
                    });
                CourseStatus::NeedsPrerequisite { nearest_unmet: nearest }
            };
            recommended.push(PlannedCourse {
                code: code.clone(),
                title,
                status,
            });
        }

        let mut rationale = format!(
            "Template for {year} {semester}: {} course(s) recommended",
            recommended.len()
        );
        if skipped > 0 {
            rationale.push_str(&format!(", {skipped} already completed"));
        }
        if flagged > 0 {
            rationale.push_str(&format!(
                ", {flagged} blocked on prerequisites with remediation suggested"
            ));
        }
        rationale.push('.');

        tracing::debug!(%year, %semester, courses = recommended.len(), "plan built");

        Ok(PlanReport {
            year,
            semester,
            recommended,
            rationale,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::test_fixtures::sample_kb;

    fn student(completed: &[&str], failed: &[&str]) -> StudentContext {
        StudentContext {
            completed: completed.iter().map(|c| c.to_string()).collect(),
            failed: failed.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_full_template_for_clean_freshman() {
        let kb = sample_kb();
        let planner = ProgressionPlanner::new(&kb);
        let report = planner
            .recommend(Year::Freshman, Semester::Fall, &StudentContext::default())
            .unwrap();
        let codes: Vec<&str> = report.recommended.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["CS 18000", "MA 16100"]);
        assert!(report
            .recommended
            .iter()
            .all(|c| c.status == CourseStatus::Ready));
    }

    #[test]
    fn test_sophomore_fall_full_template_when_nothing_completed() {
        let kb = sample_kb();
        let planner = ProgressionPlanner::new(&kb);
        let report = planner
            .recommend(Year::Sophomore, Semester::Fall, &StudentContext::default())
            .unwrap();
        // Full template list comes back; unmet prerequisites are flagged,
        // not dropped
        assert_eq!(report.recommended.len(), 2);
    }

    #[test]
    fn test_completed_courses_removed() {
        let kb = sample_kb();
        let planner = ProgressionPlanner::new(&kb);
        let report = planner
            .recommend(
                Year::Freshman,
                Semester::Fall,
                &student(&["CS 18000"], &[]),
            )
            .unwrap();
        let codes: Vec<&str> = report.recommended.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["MA 16100"]);
        assert!(report.rationale.contains("1 already completed"));
    }

    #[test]
    fn test_unmet_prereqs_flagged_with_remediation() {
        let kb = sample_kb();
        let planner = ProgressionPlanner::new(&kb);
        // Sophomore fall template needs CS 18200 + CS 24000; student has
        // nothing, so remediation points at the nearest unmet prerequisite
        let report = planner
            .recommend(Year::Sophomore, Semester::Fall, &StudentContext::default())
            .unwrap();
        for course in &report.recommended {
            match &course.status {
                CourseStatus::NeedsPrerequisite { nearest_unmet } => {
                    assert!(!nearest_unmet.is_empty());
                }
                CourseStatus::Ready => panic!("{} should be blocked", course.code),
            }
        }
        assert!(report.rationale.contains("blocked on prerequisites"));
    }

    #[test]
    fn test_remediation_names_nearest_gap() {
        let kb = sample_kb();
        let planner = ProgressionPlanner::new(&kb);
        // CS 18200/CS 24000 done, so CS 25000 and CS 25100 are Ready
        let report = planner
            .recommend(
                Year::Sophomore,
                Semester::Fall,
                &student(&["CS 18000", "CS 18200", "CS 24000"], &[]),
            )
            .unwrap();
        assert!(report
            .recommended
            .iter()
            .all(|c| c.status == CourseStatus::Ready));
    }

    #[test]
    fn test_missing_template_is_not_found() {
        let kb = sample_kb();
        let planner = ProgressionPlanner::new(&kb);
        let err = planner
            .recommend(Year::Senior, Semester::Spring, &StudentContext::default())
            .unwrap_err();
        assert!(matches!(err, AdvisorError::NotFound(_)));
    }

    #[test]
    fn test_failed_course_does_not_count_as_completed() {
        let kb = sample_kb();
        let planner = ProgressionPlanner::new(&kb);
        // Failed CS 18000: freshman spring courses depending on it get flagged
        let report = planner
            .recommend(
                Year::Freshman,
                Semester::Spring,
                &student(&["MA 16100"], &["CS 18000"]),
            )
            .unwrap();
        let cs182 = report
            .recommended
            .iter()
            .find(|c| c.code == "CS 18200")
            .unwrap();
        assert_eq!(
            cs182.status,
            CourseStatus::NeedsPrerequisite { nearest_unmet: "CS 18000".to_string() }
        );
    }
}
