//! Project milestones repository
//!
//! Table: project_milestones (unique on project_id + phase)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cap_core::traits::Id;
use cap_core::types::{MilestoneStatus, ProjectPhase};
use cap_models::ProjectMilestone;
use cap_store::{MilestoneStore, StoreError, StoreResult};
use sqlx::{FromRow, PgPool};

use crate::db_err;

#[derive(Debug, Clone, FromRow)]
struct MilestoneRow {
    id: i64,
    project_id: i64,
    phase: String,
    status: String,
    reviewer_id: Option<i64>,
    feedback: Option<String>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_status(status: &str) -> Result<MilestoneStatus, StoreError> {
    match status {
        "pending" => Ok(MilestoneStatus::Pending),
        "in_progress" => Ok(MilestoneStatus::InProgress),
        "completed" => Ok(MilestoneStatus::Completed),
        "rejected" => Ok(MilestoneStatus::Rejected),
        other => Err(StoreError::Database(format!(
            "unknown milestone status {:?}",
            other
        ))),
    }
}

impl TryFrom<MilestoneRow> for ProjectMilestone {
    type Error = StoreError;

    fn try_from(row: MilestoneRow) -> Result<Self, Self::Error> {
        let phase = ProjectPhase::parse(&row.phase).ok_or_else(|| {
            StoreError::Database(format!("unknown milestone phase {:?}", row.phase))
        })?;
        Ok(ProjectMilestone {
            id: Some(row.id),
            project_id: row.project_id,
            phase,
            status: parse_status(&row.status)?,
            reviewer_id: row.reviewer_id,
            feedback: row.feedback,
            completed_at: row.completed_at,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        })
    }
}

pub struct PgMilestoneStore {
    pool: PgPool,
}

impl PgMilestoneStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MilestoneStore for PgMilestoneStore {
    async fn find(
        &self,
        project_id: Id,
        phase: ProjectPhase,
    ) -> StoreResult<Option<ProjectMilestone>> {
        let row = sqlx::query_as::<_, MilestoneRow>(
            r#"
            SELECT id, project_id, phase, status, reviewer_id, feedback,
                   completed_at, created_at, updated_at
            FROM project_milestones
            WHERE project_id = $1 AND phase = $2
            "#,
        )
        .bind(project_id)
        .bind(phase.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(ProjectMilestone::try_from).transpose()
    }

    async fn upsert(&self, milestone: ProjectMilestone) -> StoreResult<ProjectMilestone> {
        let row = sqlx::query_as::<_, MilestoneRow>(
            r#"
            INSERT INTO project_milestones
                (project_id, phase, status, reviewer_id, feedback, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (project_id, phase) DO UPDATE
            SET status = EXCLUDED.status,
                reviewer_id = EXCLUDED.reviewer_id,
                feedback = EXCLUDED.feedback,
                completed_at = EXCLUDED.completed_at,
                updated_at = NOW()
            RETURNING id, project_id, phase, status, reviewer_id, feedback,
                      completed_at, created_at, updated_at
            "#,
        )
        .bind(milestone.project_id)
        .bind(milestone.phase.as_str())
        .bind(milestone.status.as_str())
        .bind(milestone.reviewer_id)
        .bind(&milestone.feedback)
        .bind(milestone.completed_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        row.try_into()
    }

    async fn list_for_project(&self, project_id: Id) -> StoreResult<Vec<ProjectMilestone>> {
        let rows = sqlx::query_as::<_, MilestoneRow>(
            r#"
            SELECT id, project_id, phase, status, reviewer_id, feedback,
                   completed_at, created_at, updated_at
            FROM project_milestones
            WHERE project_id = $1
            ORDER BY id
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(ProjectMilestone::try_from).collect()
    }
}
