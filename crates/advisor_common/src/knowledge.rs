//! Course Knowledge Base - normalized static academic data.
//!
//! Courses, prerequisite edges, tracks, degree-progression templates and the
//! CODO requirements entity, loaded once at startup and read-only afterwards.
//! Validation runs at load time: a cyclic prerequisite graph or a dangling
//! reference is fatal to startup, never discovered mid-query.

use crate::error::AdvisorError;
use crate::types::{Course, ProgressionTemplate, Semester, Track, Year};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Raw catalog document as supplied by the external loader (one JSON file).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub templates: Vec<ProgressionTemplate>,
    /// CODO (change of degree objective) requirements, served verbatim
    #[serde(default)]
    pub codo_requirements: Option<String>,
}

/// Validated, indexed knowledge base. Read-only after construction.
#[derive(Debug)]
pub struct KnowledgeBase {
    courses: BTreeMap<String, Course>,
    /// Inverse prerequisite edges: code -> courses that require it
    required_by: BTreeMap<String, BTreeSet<String>>,
    /// Tracks keyed by lowercased name
    tracks: BTreeMap<String, Track>,
    templates: BTreeMap<(Year, Semester), Vec<String>>,
    codo_requirements: Option<String>,
    /// Canonical numeric width per department prefix ("CS" -> 5)
    dept_widths: BTreeMap<String, usize>,
}

impl KnowledgeBase {
    /// Build and validate a knowledge base from catalog records.
    ///
    /// Fails with `LoadTimeInvariantViolation` on duplicate codes, dangling
    /// references, or a prerequisite cycle.
    pub fn from_catalog(catalog: Catalog) -> Result<Self, AdvisorError> {
        let mut courses = BTreeMap::new();
        for course in catalog.courses {
            let code = course.code.clone();
            if courses.insert(code.clone(), course).is_some() {
                return Err(AdvisorError::LoadTimeInvariantViolation(format!(
                    "duplicate course code {code}"
                )));
            }
        }

        // Prerequisite edges must point at known courses
        for course in courses.values() {
            for prereq in &course.prerequisites {
                if !courses.contains_key(prereq) {
                    return Err(AdvisorError::LoadTimeInvariantViolation(format!(
                        "{} requires unknown course {}",
                        course.code, prereq
                    )));
                }
            }
        }

        Self::check_acyclic(&courses)?;

        let mut required_by: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for course in courses.values() {
            for prereq in &course.prerequisites {
                required_by
                    .entry(prereq.clone())
                    .or_default()
                    .insert(course.code.clone());
            }
        }

        let mut tracks = BTreeMap::new();
        for track in catalog.tracks {
            for code in track
                .required_courses
                .iter()
                .chain(track.selective_groups.iter().flat_map(|g| g.courses.iter()))
            {
                if !courses.contains_key(code) {
                    return Err(AdvisorError::LoadTimeInvariantViolation(format!(
                        "track {} references unknown course {}",
                        track.name, code
                    )));
                }
            }
            tracks.insert(track.name.to_lowercase(), track);
        }

        let mut templates = BTreeMap::new();
        for template in catalog.templates {
            for code in &template.courses {
                if !courses.contains_key(code) {
                    return Err(AdvisorError::LoadTimeInvariantViolation(format!(
                        "template {} {} references unknown course {}",
                        template.year, template.semester, code
                    )));
                }
            }
            templates.insert((template.year, template.semester), template.courses);
        }

        let mut dept_widths = BTreeMap::new();
        for code in courses.keys() {
            if let Some((dept, number)) = code.split_once(' ') {
                dept_widths.insert(dept.to_string(), number.len());
            }
        }

        tracing::debug!(
            courses = courses.len(),
            tracks = tracks.len(),
            templates = templates.len(),
            "knowledge base loaded"
        );

        Ok(Self {
            courses,
            required_by,
            tracks,
            templates,
            codo_requirements: catalog.codo_requirements,
            dept_widths,
        })
    }

    /// Load a catalog from a JSON file and validate it.
    pub fn load_json(path: &Path) -> Result<Self, AdvisorError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AdvisorError::LoadTimeInvariantViolation(format!(
                "cannot read catalog {}: {e}",
                path.display()
            ))
        })?;
        let catalog: Catalog = serde_json::from_str(&contents).map_err(|e| {
            AdvisorError::LoadTimeInvariantViolation(format!(
                "malformed catalog {}: {e}",
                path.display()
            ))
        })?;
        Self::from_catalog(catalog)
    }

    /// Kahn's algorithm over the prerequisite edges. Any leftover node sits
    /// on a cycle.
    fn check_acyclic(courses: &BTreeMap<String, Course>) -> Result<(), AdvisorError> {
        let mut in_degree: BTreeMap<&str, usize> =
            courses.keys().map(|c| (c.as_str(), 0)).collect();
        for course in courses.values() {
            for prereq in &course.prerequisites {
                if let Some(degree) = in_degree.get_mut(prereq.as_str()) {
                    *degree += 1;
                }
            }
        }

        let mut queue: Vec<&str> = in_degree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(c, _)| *c)
            .collect();
        let mut visited = 0usize;
        while let Some(code) = queue.pop() {
            visited += 1;
            if let Some(course) = courses.get(code) {
                for prereq in &course.prerequisites {
                    if let Some(degree) = in_degree.get_mut(prereq.as_str()) {
                        *degree -= 1;
                        if *degree == 0 {
                            queue.push(prereq.as_str());
                        }
                    }
                }
            }
        }

        if visited != courses.len() {
            let mut cyclic: Vec<&str> = in_degree
                .iter()
                .filter(|(_, d)| **d > 0)
                .map(|(c, _)| *c)
                .collect();
            cyclic.sort_unstable();
            return Err(AdvisorError::LoadTimeInvariantViolation(format!(
                "prerequisite cycle involving: {}",
                cyclic.join(", ")
            )));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn course(&self, code: &str) -> Option<&Course> {
        self.courses.get(code)
    }

    pub fn has_course(&self, code: &str) -> bool {
        self.courses.contains_key(code)
    }

    pub fn course_count(&self) -> usize {
        self.courses.len()
    }

    pub fn course_codes(&self) -> impl Iterator<Item = &str> {
        self.courses.keys().map(|c| c.as_str())
    }

    /// Courses that list `code` as a direct prerequisite.
    pub fn required_by(&self, code: &str) -> impl Iterator<Item = &str> {
        self.required_by
            .get(code)
            .into_iter()
            .flat_map(|set| set.iter().map(|c| c.as_str()))
    }

    /// Case-insensitive track lookup by name.
    pub fn track(&self, name: &str) -> Option<&Track> {
        self.tracks.get(&name.to_lowercase())
    }

    pub fn track_names(&self) -> impl Iterator<Item = &str> {
        self.tracks.values().map(|t| t.name.as_str())
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Template lookup. A missing (year, semester) pair is a miss, not an
    /// error.
    pub fn template(&self, year: Year, semester: Semester) -> Option<&[String]> {
        self.templates.get(&(year, semester)).map(|v| v.as_slice())
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    pub fn codo_requirements(&self) -> Option<&str> {
        self.codo_requirements.as_deref()
    }

    /// Known department prefixes ("CS", "MA", ...).
    pub fn departments(&self) -> impl Iterator<Item = &str> {
        self.dept_widths.keys().map(|d| d.as_str())
    }

    /// Canonical numeric width for a department's codes, if known.
    pub fn dept_width(&self, dept: &str) -> Option<usize> {
        self.dept_widths.get(dept).copied()
    }
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use super::*;
    use crate::types::SelectiveGroup;

    pub fn course(code: &str, title: &str, prereqs: &[&str]) -> Course {
        Course {
            code: code.to_string(),
            title: title.to_string(),
            description: format!("{title}."),
            credit_hours: 3.0,
            difficulty: Some(3.5),
            prerequisites: prereqs.iter().map(|c| c.to_string()).collect(),
            learning_outcomes: Vec::new(),
        }
    }

    /// Small CS catalog used across the test suite.
    ///
    /// Prerequisite chains: CS 18000 -> {CS 18200, CS 24000},
    /// {CS 18200, CS 24000} -> CS 25000/25100, CS 25000+25100 -> CS 25200,
    /// CS 25100 -> CS 38100.
    pub fn sample_catalog() -> Catalog {
        Catalog {
            courses: vec![
                course("CS 18000", "Problem Solving And Object-Oriented Programming", &[]),
                course("CS 18200", "Foundations Of Computer Science", &["CS 18000"]),
                course("CS 24000", "Programming In C", &["CS 18000"]),
                course("CS 25000", "Computer Architecture", &["CS 18200", "CS 24000"]),
                course("CS 25100", "Data Structures And Algorithms", &["CS 18200", "CS 24000"]),
                course("CS 25200", "Systems Programming", &["CS 25000", "CS 25100"]),
                course("CS 38100", "Introduction To The Analysis Of Algorithms", &["CS 25100"]),
                course("CS 37300", "Data Mining And Machine Learning", &["CS 25100"]),
                course("CS 40800", "Software Testing", &["CS 25200"]),
                course("MA 16100", "Plane Analytic Geometry And Calculus I", &[]),
                course("MA 16200", "Plane Analytic Geometry And Calculus II", &["MA 16100"]),
            ],
            tracks: vec![
                Track {
                    name: "Machine Intelligence".to_string(),
                    required_courses: ["CS 37300", "CS 38100"]
                        .iter()
                        .map(|c| c.to_string())
                        .collect(),
                    selective_groups: vec![SelectiveGroup {
                        name: "Statistics selective".to_string(),
                        courses: ["MA 16200"].iter().map(|c| c.to_string()).collect(),
                        min_count: 1,
                    }],
                },
                Track {
                    name: "Software Engineering".to_string(),
                    required_courses: ["CS 25200", "CS 38100", "CS 40800"]
                        .iter()
                        .map(|c| c.to_string())
                        .collect(),
                    selective_groups: Vec::new(),
                },
            ],
            templates: vec![
                ProgressionTemplate {
                    year: Year::Freshman,
                    semester: Semester::Fall,
                    courses: vec!["CS 18000".to_string(), "MA 16100".to_string()],
                },
                ProgressionTemplate {
                    year: Year::Freshman,
                    semester: Semester::Spring,
                    courses: vec![
                        "CS 18200".to_string(),
                        "CS 24000".to_string(),
                        "MA 16200".to_string(),
                    ],
                },
                ProgressionTemplate {
                    year: Year::Sophomore,
                    semester: Semester::Fall,
                    courses: vec!["CS 25000".to_string(), "CS 25100".to_string()],
                },
                ProgressionTemplate {
                    year: Year::Sophomore,
                    semester: Semester::Spring,
                    courses: vec!["CS 25200".to_string()],
                },
            ],
            codo_requirements: Some(
                "CODO into Computer Science requires: minimum 12 credit hours at the \
                 university, CS 18000 with grade B or better, Calculus I with grade B \
                 or better, and a cumulative GPA of 3.0 or higher."
                    .to_string(),
            ),
        }
    }

    pub fn sample_kb() -> KnowledgeBase {
        KnowledgeBase::from_catalog(sample_catalog()).expect("sample catalog is valid")
    }
}
