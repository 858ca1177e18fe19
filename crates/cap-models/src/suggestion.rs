//! Team match suggestion model
//!
//! Table: team_match_suggestions

use chrono::{DateTime, Utc};
use cap_core::traits::{Entity, Id, Identifiable, Timestamped};
use cap_core::types::MatchLevel;
use serde::{Deserialize, Serialize};

/// Cached ranked candidate for a project
///
/// The full per-project set is replaced on every matching query; rows carry
/// no uniqueness invariant across calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMatchSuggestion {
    pub id: Option<Id>,
    pub project_id: Id,
    pub student_id: Id,
    /// Percentage overlap with the project's required skills (0-100)
    pub match_score: u8,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub match_level: MatchLevel,
    pub created_at: Option<DateTime<Utc>>,
}

impl Identifiable for TeamMatchSuggestion {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for TeamMatchSuggestion {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

impl Entity for TeamMatchSuggestion {
    const TABLE_NAME: &'static str = "team_match_suggestions";
    const TYPE_NAME: &'static str = "TeamMatchSuggestion";
}
