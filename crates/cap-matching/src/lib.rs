//! Matching algorithms for Capstone RS
//!
//! Pure functions only: skill match scoring for team formation and Jaccard
//! similarity for duplicate-abstract detection. No storage, no side effects.

pub mod duplicate;
pub mod scorer;

pub use duplicate::{check_duplicate, similarity, CorpusEntry, DuplicateMatch, DuplicateReport};
pub use scorer::{score, SkillMatch};
