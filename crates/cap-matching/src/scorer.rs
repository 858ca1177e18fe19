//! Skill match scoring
//!
//! Scores a student's skill set against a project's required skills as the
//! percentage of requirements covered. Matching is case-insensitive and
//! whitespace-trimmed; the outcome lists matched and missing requirements in
//! their normalized form, preserving the project's declared order.

use std::collections::HashSet;

use cap_core::types::MatchLevel;
use serde::Serialize;

/// Outcome of scoring one candidate against one project
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SkillMatch {
    /// Percentage of required skills covered (0-100)
    pub score: u8,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub match_level: MatchLevel,
}

fn normalize(skill: &str) -> String {
    skill.trim().to_lowercase()
}

/// Score `student_skills` against `required_skills`.
///
/// Empty requirements score 0 with `no_requirements` (not a candidate
/// signal). Otherwise `score = round(100 * |matched| / |required|)` and the
/// level is bucketed by [`MatchLevel::for_score`].
pub fn score(student_skills: &[String], required_skills: &[String]) -> SkillMatch {
    let mut seen = HashSet::new();
    let required: Vec<String> = required_skills
        .iter()
        .map(|s| normalize(s))
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect();

    if required.is_empty() {
        return SkillMatch {
            score: 0,
            matched_skills: Vec::new(),
            missing_skills: Vec::new(),
            match_level: MatchLevel::NoRequirements,
        };
    }

    let student: HashSet<String> = student_skills
        .iter()
        .map(|s| normalize(s))
        .filter(|s| !s.is_empty())
        .collect();

    let (matched_skills, missing_skills): (Vec<String>, Vec<String>) =
        required.into_iter().partition(|s| student.contains(s));

    let total = matched_skills.len() + missing_skills.len();
    let score = ((100.0 * matched_skills.len() as f64) / total as f64).round() as u8;

    SkillMatch {
        score,
        matched_skills,
        missing_skills,
        match_level: MatchLevel::for_score(score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_partial_match_scenario() {
        let result = score(&skills(&["Go", "Python"]), &skills(&["go", "react"]));
        assert_eq!(result.score, 50);
        assert_eq!(result.matched_skills, vec!["go"]);
        assert_eq!(result.missing_skills, vec!["react"]);
        assert_eq!(result.match_level, MatchLevel::GoodFit);
    }

    #[test]
    fn test_no_requirements() {
        let result = score(&skills(&["rust"]), &[]);
        assert_eq!(result.score, 0);
        assert_eq!(result.match_level, MatchLevel::NoRequirements);
        assert!(result.matched_skills.is_empty());
        assert!(result.missing_skills.is_empty());
    }

    #[test]
    fn test_empty_student_skills() {
        let result = score(&[], &skills(&["rust", "sql"]));
        assert_eq!(result.score, 0);
        assert_eq!(result.missing_skills, vec!["rust", "sql"]);
        assert_eq!(result.match_level, MatchLevel::NeedsTraining);
    }

    #[test]
    fn test_full_match_is_best_fit() {
        let result = score(&skills(&[" RUST ", "sql"]), &skills(&["Rust", "SQL"]));
        assert_eq!(result.score, 100);
        assert_eq!(result.match_level, MatchLevel::BestFit);
        assert!(result.missing_skills.is_empty());
    }

    #[test]
    fn test_score_bounds_and_monotonicity() {
        let required = skills(&["a1", "b2", "c3", "d4"]);
        let mut previous = 0;
        for covered in 0..=required.len() {
            let student: Vec<String> = required[..covered].to_vec();
            let result = score(&student, &required);
            assert!(result.score <= 100);
            assert!(result.score >= previous);
            previous = result.score;
        }
        assert_eq!(previous, 100);
    }

    #[test]
    fn test_duplicate_requirements_counted_once() {
        let result = score(&skills(&["go"]), &skills(&["go", "GO", " go "]));
        assert_eq!(result.score, 100);
        assert_eq!(result.matched_skills, vec!["go"]);
    }
}
