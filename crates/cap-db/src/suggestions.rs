//! Team match suggestions repository
//!
//! Table: team_match_suggestions

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cap_core::traits::Id;
use cap_core::types::MatchLevel;
use cap_models::TeamMatchSuggestion;
use cap_store::{StoreError, StoreResult, SuggestionStore};
use sqlx::{FromRow, PgPool};

use crate::db_err;

#[derive(Debug, Clone, FromRow)]
struct SuggestionRow {
    id: i64,
    project_id: i64,
    student_id: i64,
    match_score: i32,
    matched_skills: Vec<String>,
    missing_skills: Vec<String>,
    match_level: String,
    created_at: DateTime<Utc>,
}

fn parse_level(level: &str) -> Result<MatchLevel, StoreError> {
    match level {
        "best_fit" => Ok(MatchLevel::BestFit),
        "good_fit" => Ok(MatchLevel::GoodFit),
        "needs_training" => Ok(MatchLevel::NeedsTraining),
        "no_requirements" => Ok(MatchLevel::NoRequirements),
        other => Err(StoreError::Database(format!(
            "unknown match level {:?}",
            other
        ))),
    }
}

impl TryFrom<SuggestionRow> for TeamMatchSuggestion {
    type Error = StoreError;

    fn try_from(row: SuggestionRow) -> Result<Self, Self::Error> {
        Ok(TeamMatchSuggestion {
            id: Some(row.id),
            project_id: row.project_id,
            student_id: row.student_id,
            match_score: row.match_score.clamp(0, 100) as u8,
            matched_skills: row.matched_skills,
            missing_skills: row.missing_skills,
            match_level: parse_level(&row.match_level)?,
            created_at: Some(row.created_at),
        })
    }
}

pub struct PgSuggestionStore {
    pool: PgPool,
}

impl PgSuggestionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SuggestionStore for PgSuggestionStore {
    async fn replace_for_project(
        &self,
        project_id: Id,
        suggestions: Vec<TeamMatchSuggestion>,
    ) -> StoreResult<()> {
        // Delete and insert inside one transaction so readers never observe
        // an empty interval.
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query("DELETE FROM team_match_suggestions WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        for suggestion in &suggestions {
            sqlx::query(
                r#"
                INSERT INTO team_match_suggestions
                    (project_id, student_id, match_score, matched_skills,
                     missing_skills, match_level)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(project_id)
            .bind(suggestion.student_id)
            .bind(suggestion.match_score as i32)
            .bind(&suggestion.matched_skills)
            .bind(&suggestion.missing_skills)
            .bind(suggestion.match_level.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)
    }

    async fn list_for_project(&self, project_id: Id) -> StoreResult<Vec<TeamMatchSuggestion>> {
        let rows = sqlx::query_as::<_, SuggestionRow>(
            r#"
            SELECT id, project_id, student_id, match_score, matched_skills,
                   missing_skills, match_level, created_at
            FROM team_match_suggestions
            WHERE project_id = $1
            ORDER BY match_score DESC, student_id
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(TeamMatchSuggestion::try_from).collect()
    }
}
