//! Duplicate-abstract detection
//!
//! Jaccard similarity over token sets: lowercase, punctuation stripped to
//! whitespace, tokens of length <= 2 dropped. The corpus check is advisory
//! only; it never blocks a submission by itself.

use std::collections::HashSet;

use cap_core::traits::Id;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Existing abstract to compare against
#[derive(Debug, Clone)]
pub struct CorpusEntry {
    pub project_id: Id,
    pub title: String,
    pub abstract_text: String,
}

/// One corpus entry at or above the similarity threshold
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateMatch {
    pub project_id: Id,
    pub title: String,
    pub similarity: f64,
}

/// Result of checking a candidate abstract against the corpus
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateReport {
    pub is_duplicate: bool,
    /// Entries at or above the threshold, most similar first
    pub matches: Vec<DuplicateMatch>,
    /// Highest similarity across the whole corpus, even below threshold
    pub highest_similarity: f64,
}

fn token_set(text: &str) -> HashSet<String> {
    NON_ALPHANUMERIC
        .split(&text.to_lowercase())
        .filter(|token| token.len() > 2)
        .map(str::to_string)
        .collect()
}

/// Jaccard similarity of two texts as a percentage, rounded to two decimals.
pub fn similarity(text_a: &str, text_b: &str) -> f64 {
    let set_a = token_set(text_a);
    let set_b = token_set(text_b);

    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();

    let percentage = 100.0 * intersection as f64 / union as f64;
    (percentage * 100.0).round() / 100.0
}

/// Compare `new_abstract` against every corpus entry.
///
/// Matches at or above `threshold` are collected most-similar first;
/// `highest_similarity` reports the best score seen regardless of threshold.
pub fn check_duplicate(new_abstract: &str, corpus: &[CorpusEntry], threshold: f64) -> DuplicateReport {
    let mut matches = Vec::new();
    let mut highest_similarity: f64 = 0.0;

    for entry in corpus {
        let score = similarity(new_abstract, &entry.abstract_text);
        highest_similarity = highest_similarity.max(score);
        if score >= threshold {
            matches.push(DuplicateMatch {
                project_id: entry.project_id,
                title: entry.title.clone(),
                similarity: score,
            });
        }
    }

    matches.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.project_id.cmp(&b.project_id))
    });

    DuplicateReport {
        is_duplicate: !matches.is_empty(),
        matches,
        highest_similarity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(project_id: Id, abstract_text: &str) -> CorpusEntry {
        CorpusEntry {
            project_id,
            title: format!("Project {}", project_id),
            abstract_text: abstract_text.to_string(),
        }
    }

    #[test]
    fn test_similarity_symmetry() {
        let a = "Machine learning for medical imaging pipelines";
        let b = "Medical imaging with deep learning methods";
        assert_eq!(similarity(a, b), similarity(b, a));
    }

    #[test]
    fn test_self_similarity_is_full() {
        let text = "A compiler frontend for a dependently typed language";
        assert_eq!(similarity(text, text), 100.0);
    }

    #[test]
    fn test_empty_text_scores_zero() {
        assert_eq!(similarity("", "anything at all here"), 0.0);
        assert_eq!(similarity("", ""), 0.0);
    }

    #[test]
    fn test_short_tokens_and_punctuation_dropped() {
        // "a", "of", "to" are <= 2 chars; punctuation becomes whitespace
        assert_eq!(similarity("a of to!", "of a to?"), 0.0);
        assert_eq!(similarity("graph-based search", "graph based search"), 100.0);
    }

    #[test]
    fn test_sixty_percent_overlap() {
        // Union of 100 distinct tokens, 60 shared: 80 tokens each side,
        // tokens 20..80 in common.
        let words_a: Vec<String> = (0..80).map(|i| format!("tok{:03}", i)).collect();
        let words_b: Vec<String> = (20..100).map(|i| format!("tok{:03}", i)).collect();
        let sim = similarity(&words_a.join(" "), &words_b.join(" "));
        assert_eq!(sim, 60.0);

        let report = check_duplicate(&words_a.join(" "), &[entry(1, &words_b.join(" "))], 60.0);
        assert!(report.is_duplicate);
        assert_eq!(report.highest_similarity, 60.0);
    }

    #[test]
    fn test_check_collects_and_sorts_matches() {
        let candidate = "distributed key value store with raft consensus replication";
        let corpus = vec![
            entry(1, "distributed key value store with raft consensus replication"),
            entry(2, "distributed store with consensus"),
            entry(3, "compilers and type systems"),
        ];
        let report = check_duplicate(candidate, &corpus, 40.0);

        assert!(report.is_duplicate);
        assert_eq!(report.matches[0].project_id, 1);
        assert_eq!(report.matches[0].similarity, 100.0);
        assert!(report
            .matches
            .windows(2)
            .all(|pair| pair[0].similarity >= pair[1].similarity));
        assert_eq!(report.highest_similarity, 100.0);
    }

    #[test]
    fn test_highest_reported_below_threshold() {
        let report = check_duplicate(
            "streaming anomaly detection over sensor data",
            &[entry(9, "anomaly detection applied elsewhere entirely")],
            90.0,
        );
        assert!(!report.is_duplicate);
        assert!(report.matches.is_empty());
        assert!(report.highest_similarity > 0.0);
    }
}
