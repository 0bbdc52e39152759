//! Course Code Normalizer.
//!
//! Canonicalizes loosely formatted course mentions ("cs182", "CS 182",
//! "compsci 180") against the knowledge base's canonical identifiers.
//! Padding a short number to the canonical width happens only when the
//! padded form actually exists in the catalog; otherwise the normalized
//! original is returned and downstream lookups fail as "not found" rather
//! than guessing.

use crate::knowledge::KnowledgeBase;
use once_cell::sync::Lazy;
use regex::Regex;

/// Department spellings students actually type, mapped to catalog prefixes.
static DEPT_SYNONYMS: &[(&str, &str)] = &[
    ("COMPSCI", "CS"),
    ("COMP SCI", "CS"),
    ("COMPUTER SCIENCE", "CS"),
    ("MATH", "MA"),
    ("MATHEMATICS", "MA"),
    ("STATS", "STAT"),
    ("STATISTICS", "STAT"),
    ("PHYSICS", "PHYS"),
];

static CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z][A-Za-z ]{0,19}?)\s*([0-9]{3,5})$").expect("valid regex"));

/// Normalizes free-text course mentions against a loaded knowledge base.
pub struct CourseNormalizer<'a> {
    kb: &'a KnowledgeBase,
}

impl<'a> CourseNormalizer<'a> {
    pub fn new(kb: &'a KnowledgeBase) -> Self {
        Self { kb }
    }

    /// Canonicalize one course mention.
    ///
    /// Returns the canonical code when a confident match exists, otherwise
    /// the case/spacing-normalized input. Idempotent: normalizing a
    /// canonical code returns it unchanged.
    pub fn normalize(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        let Some((dept, number)) = split_mention(trimmed) else {
            return trimmed.to_uppercase();
        };
        let dept = expand_department(&dept);
        let candidate = format!("{dept} {number}");

        if self.kb.has_course(&candidate) {
            return candidate;
        }

        // Pad a short number to the department's canonical width, but only
        // accept the result when it is an actual catalog entry.
        if let Some(width) = self.kb.dept_width(&dept) {
            if number.len() < width {
                let padded = format!("{dept} {number:0<width$}");
                if self.kb.has_course(&padded) {
                    return padded;
                }
                // Fall back to prefix matching when zero-padding misses;
                // only an unambiguous single hit counts.
                let prefix = format!("{dept} {number}");
                let mut hits = self
                    .kb
                    .course_codes()
                    .filter(|code| code.starts_with(&prefix));
                if let (Some(only), None) = (hits.next(), hits.next()) {
                    return only.to_string();
                }
            }
        }

        candidate
    }

    /// Normalize and resolve in one step; `None` when the mention does not
    /// correspond to a catalog course.
    pub fn resolve(&self, raw: &str) -> Option<String> {
        let normalized = self.normalize(raw);
        self.kb.has_course(&normalized).then_some(normalized)
    }
}

/// Split "cs182" / "CS 182" / "comp sci 180" into (department, number).
fn split_mention(raw: &str) -> Option<(String, String)> {
    let caps = CODE_PATTERN.captures(raw)?;
    let dept = caps[1].trim().to_uppercase();
    let number = caps[2].to_string();
    Some((dept, number))
}

fn expand_department(dept: &str) -> String {
    for (synonym, canonical) in DEPT_SYNONYMS {
        if dept == *synonym {
            return (*canonical).to_string();
        }
    }
    dept.to_string()
}
