//! Prerequisite & What-If Reasoner.
//!
//! Deterministic reasoning over the validated prerequisite graph:
//! eligibility is a set-containment test, cascade impact is a breadth-first
//! traversal of the inverse ("required-by") edges, and remediation walks the
//! forward edges toward the nearest unmet prerequisite. All orderings are
//! stable: (graph distance, canonical code).

use crate::error::AdvisorError;
use crate::knowledge::KnowledgeBase;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Result of an eligibility / what-if check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityReport {
    pub target: String,
    pub eligible: bool,
    /// Direct prerequisites of the target not yet completed
    pub missing: BTreeSet<String>,
    /// Courses whose eligibility is affected by the failed/missing courses,
    /// nearest first, no duplicates
    pub cascade: Vec<String>,
}

pub struct PrereqReasoner<'a> {
    kb: &'a KnowledgeBase,
}

impl<'a> PrereqReasoner<'a> {
    pub fn new(kb: &'a KnowledgeBase) -> Self {
        Self { kb }
    }

    /// Check eligibility for `target` and compute the cascading impact of
    /// everything failed or missing. Unknown targets are a `NotFound`
    /// condition, never a silent empty report.
    pub fn check(
        &self,
        target: &str,
        completed: &BTreeSet<String>,
        failed: &BTreeSet<String>,
    ) -> Result<EligibilityReport, AdvisorError> {
        let course = self
            .kb
            .course(target)
            .ok_or_else(|| AdvisorError::NotFound(format!("course {target}")))?;

        let missing: BTreeSet<String> = course
            .prerequisites
            .iter()
            .filter(|p| !completed.contains(*p))
            .cloned()
            .collect();

        let seeds: BTreeSet<String> = failed.iter().chain(missing.iter()).cloned().collect();
        let cascade = self.cascade_from(&seeds, completed);

        Ok(EligibilityReport {
            target: target.to_string(),
            eligible: missing.is_empty(),
            missing,
            cascade,
        })
    }

    /// Forward traversal over the "required-by" inverse edges from each seed
    /// course: every course reachable that is not already completed, each
    /// listed once, ordered by graph distance then canonical code.
    pub fn cascade_from(
        &self,
        seeds: &BTreeSet<String>,
        completed: &BTreeSet<String>,
    ) -> Vec<String> {
        let mut distance: BTreeMap<String, usize> = BTreeMap::new();
        let mut queue: VecDeque<(String, usize)> = VecDeque::new();

        for seed in seeds {
            queue.push_back((seed.clone(), 0));
        }

        while let Some((code, dist)) = queue.pop_front() {
            for dependent in self.kb.required_by(&code) {
                if distance.contains_key(dependent) {
                    continue;
                }
                distance.insert(dependent.to_string(), dist + 1);
                queue.push_back((dependent.to_string(), dist + 1));
            }
        }

        let mut affected: Vec<(usize, String)> = distance
            .into_iter()
            .filter(|(code, _)| !completed.contains(code) && !seeds.contains(code))
            .map(|(code, dist)| (dist, code))
            .collect();
        affected.sort();
        affected.into_iter().map(|(_, code)| code).collect()
    }

    /// The nearest unmet prerequisite for a course: breadth-first over the
    /// forward edges, preferring lower depth and then canonical code. Used
    /// by the planner as a remediation suggestion.
    pub fn nearest_unmet_prerequisite(
        &self,
        target: &str,
        completed: &BTreeSet<String>,
    ) -> Option<String> {
        let course = self.kb.course(target)?;
        let mut queue: VecDeque<(String, usize)> = course
            .prerequisites
            .iter()
            .map(|p| (p.clone(), 1))
            .collect();
        let mut seen: BTreeSet<String> = course.prerequisites.iter().cloned().collect();
        let mut best: Option<(usize, String)> = None;

        while let Some((code, depth)) = queue.pop_front() {
            if !completed.contains(&code) {
                let candidate = (depth, code.clone());
                let better = best
                    .as_ref()
                    .map(|current| candidate < *current)
                    .unwrap_or(true);
                if better {
                    best = Some(candidate);
                }
            }
            if let Some(course) = self.kb.course(&code) {
                for prereq in &course.prerequisites {
                    if seen.insert(prereq.clone()) {
                        queue.push_back((prereq.clone(), depth + 1));
                    }
                }
            }
        }

        best.map(|(_, code)| code)
    }

    /// True when every direct prerequisite of `target` is completed.
    pub fn eligible(&self, target: &str, completed: &BTreeSet<String>) -> Result<bool, AdvisorError> {
        Ok(self
            .check(target, completed, &BTreeSet::new())?
            .eligible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::test_fixtures::sample_kb;

    fn set(codes: &[&str]) -> BTreeSet<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_no_prereqs_always_eligible() {
        let kb = sample_kb();
        let reasoner = PrereqReasoner::new(&kb);
        assert!(reasoner.eligible("CS 18000", &BTreeSet::new()).unwrap());
    }

    #[test]
    fn test_eligible_with_all_prereqs_completed() {
        let kb = sample_kb();
        let reasoner = PrereqReasoner::new(&kb);
        // Holds for every course in the catalog
        for code in kb.course_codes() {
            let prereqs = kb.course(code).unwrap().prerequisites.clone();
            assert!(
                reasoner.eligible(code, &prereqs).unwrap(),
                "{code} should be eligible with exactly its prerequisites completed"
            );
        }
    }

    #[test]
    fn test_empty_completed_eligible_iff_no_prereqs() {
        let kb = sample_kb();
        let reasoner = PrereqReasoner::new(&kb);
        for code in kb.course_codes() {
            let has_prereqs = !kb.course(code).unwrap().prerequisites.is_empty();
            let eligible = reasoner.eligible(code, &BTreeSet::new()).unwrap();
            assert_eq!(eligible, !has_prereqs, "mismatch for {code}");
        }
    }

    #[test]
    fn test_missing_is_exactly_direct_prereqs() {
        let kb = sample_kb();
        let reasoner = PrereqReasoner::new(&kb);
        let report = reasoner
            .check("CS 25200", &BTreeSet::new(), &BTreeSet::new())
            .unwrap();
        assert!(!report.eligible);
        assert_eq!(report.missing, set(&["CS 25000", "CS 25100"]));
    }

    #[test]
    fn test_partial_completion_shrinks_missing() {
        let kb = sample_kb();
        let reasoner = PrereqReasoner::new(&kb);
        let report = reasoner
            .check("CS 25200", &set(&["CS 25000"]), &BTreeSet::new())
            .unwrap();
        assert_eq!(report.missing, set(&["CS 25100"]));
    }

    #[test]
    fn test_unknown_course_is_not_found() {
        let kb = sample_kb();
        let reasoner = PrereqReasoner::new(&kb);
        let err = reasoner
            .check("CS 99999", &BTreeSet::new(), &BTreeSet::new())
            .unwrap_err();
        assert!(matches!(err, AdvisorError::NotFound(_)));
    }

    #[test]
    fn test_cascade_of_failing_cs18000() {
        let kb = sample_kb();
        let reasoner = PrereqReasoner::new(&kb);
        let cascade = reasoner.cascade_from(&set(&["CS 18000"]), &BTreeSet::new());

        // Direct dependents first, then everything transitively affected
        assert_eq!(cascade[..2], ["CS 18200".to_string(), "CS 24000".to_string()]);
        for code in ["CS 25000", "CS 25100", "CS 25200", "CS 38100", "CS 37300", "CS 40800"] {
            assert!(cascade.contains(&code.to_string()), "cascade missing {code}");
        }
    }

    #[test]
    fn test_cascade_has_no_duplicates() {
        let kb = sample_kb();
        let reasoner = PrereqReasoner::new(&kb);
        // CS 18200 and CS 24000 share downstream dependents; each appears once
        let cascade = reasoner.cascade_from(&set(&["CS 18200", "CS 24000"]), &BTreeSet::new());
        let unique: BTreeSet<&String> = cascade.iter().collect();
        assert_eq!(unique.len(), cascade.len());
    }

    #[test]
    fn test_cascade_ordered_nearest_first() {
        let kb = sample_kb();
        let reasoner = PrereqReasoner::new(&kb);
        let cascade = reasoner.cascade_from(&set(&["CS 25100"]), &BTreeSet::new());
        // Distance 1: CS 25200, CS 37300, CS 38100 (code order); distance 2: CS 40800
        assert_eq!(
            cascade,
            vec![
                "CS 25200".to_string(),
                "CS 37300".to_string(),
                "CS 38100".to_string(),
                "CS 40800".to_string(),
            ]
        );
    }

    #[test]
    fn test_cascade_excludes_completed_courses() {
        let kb = sample_kb();
        let reasoner = PrereqReasoner::new(&kb);
        let cascade = reasoner.cascade_from(&set(&["CS 18000"]), &set(&["CS 18200"]));
        assert!(!cascade.contains(&"CS 18200".to_string()));
        assert!(cascade.contains(&"CS 24000".to_string()));
    }

    #[test]
    fn test_what_if_failure_report() {
        let kb = sample_kb();
        let reasoner = PrereqReasoner::new(&kb);
        // Student completed CS 18000 but hypothetically fails it
        let report = reasoner
            .check("CS 18000", &BTreeSet::new(), &set(&["CS 18000"]))
            .unwrap();
        assert!(report.eligible); // no prerequisites of its own
        assert!(report.cascade.contains(&"CS 18200".to_string()));
        assert!(report.cascade.contains(&"CS 24000".to_string()));
    }

    #[test]
    fn test_nearest_unmet_prerequisite_is_direct_when_unmet() {
        let kb = sample_kb();
        let reasoner = PrereqReasoner::new(&kb);
        let nearest = reasoner.nearest_unmet_prerequisite("CS 25200", &BTreeSet::new());
        // Both direct prereqs unmet; code order breaks the tie
        assert_eq!(nearest.as_deref(), Some("CS 25000"));
    }

    #[test]
    fn test_nearest_unmet_prerequisite_walks_deeper() {
        let kb = sample_kb();
        let reasoner = PrereqReasoner::new(&kb);
        // Direct prereqs completed-in-name only: CS 25000 done, CS 25100 done,
        // so nothing is unmet at depth 1 and deeper levels are consulted
        let completed = set(&["CS 25000", "CS 25100"]);
        let nearest = reasoner.nearest_unmet_prerequisite("CS 25200", &completed);
        // CS 18200 / CS 24000 at depth 2 are unmet; code order wins
        assert_eq!(nearest.as_deref(), Some("CS 18200"));
    }

    #[test]
    fn test_nearest_unmet_none_when_all_met() {
        let kb = sample_kb();
        let reasoner = PrereqReasoner::new(&kb);
        let completed = set(&[
            "CS 18000", "CS 18200", "CS 24000", "CS 25000", "CS 25100",
        ]);
        assert_eq!(reasoner.nearest_unmet_prerequisite("CS 25200", &completed), None);
    }
}
