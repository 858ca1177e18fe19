//! Projects repository
//!
//! Table: projects

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cap_core::traits::Id;
use cap_core::types::ProjectPhase;
use cap_models::Project;
use cap_store::{ProjectStore, StoreError, StoreResult};
use sqlx::{FromRow, PgPool};

use crate::db_err;

#[derive(Debug, Clone, FromRow)]
struct ProjectRow {
    id: i64,
    title: String,
    abstract_text: String,
    author_id: i64,
    student_ids: Vec<i64>,
    supervisor_id: Option<i64>,
    required_skills: Vec<String>,
    phase: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = StoreError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let phase = ProjectPhase::parse(&row.phase)
            .ok_or_else(|| StoreError::Database(format!("unknown project phase {:?}", row.phase)))?;
        Ok(Project {
            id: Some(row.id),
            title: row.title,
            abstract_text: row.abstract_text,
            author_id: row.author_id,
            student_ids: row.student_ids,
            supervisor_id: row.supervisor_id,
            required_skills: row.required_skills,
            phase,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        })
    }
}

pub struct PgProjectStore {
    pool: PgPool,
}

impl PgProjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn insert(&self, project: Project) -> StoreResult<Project> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            INSERT INTO projects
                (title, abstract_text, author_id, student_ids, supervisor_id,
                 required_skills, phase)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, abstract_text, author_id, student_ids,
                      supervisor_id, required_skills, phase, created_at, updated_at
            "#,
        )
        .bind(&project.title)
        .bind(&project.abstract_text)
        .bind(project.author_id)
        .bind(&project.student_ids)
        .bind(project.supervisor_id)
        .bind(&project.required_skills)
        .bind(project.phase.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        row.try_into()
    }

    async fn find(&self, id: Id) -> StoreResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, title, abstract_text, author_id, student_ids,
                   supervisor_id, required_skills, phase, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(Project::try_from).transpose()
    }

    async fn list(&self) -> StoreResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, title, abstract_text, author_id, student_ids,
                   supervisor_id, required_skills, phase, created_at, updated_at
            FROM projects
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(Project::try_from).collect()
    }

    async fn set_phase(
        &self,
        id: Id,
        expected: ProjectPhase,
        next: ProjectPhase,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET phase = $3, updated_at = NOW()
            WHERE id = $1 AND phase = $2
            "#,
        )
        .bind(id)
        .bind(expected.as_str())
        .bind(next.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected() == 1)
    }

    async fn assign_supervisor(&self, id: Id, supervisor_id: Id) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET supervisor_id = $2, updated_at = NOW()
            WHERE id = $1 AND supervisor_id IS NULL
            "#,
        )
        .bind(id)
        .bind(supervisor_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected() == 1)
    }

    async fn add_student(&self, id: Id, user_id: Id) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE projects
            SET student_ids = array_append(student_ids, $2), updated_at = NOW()
            WHERE id = $1 AND NOT (student_ids @> ARRAY[$2]::BIGINT[])
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn remove_student(&self, id: Id, user_id: Id) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE projects
            SET student_ids = array_remove(student_ids, $2), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }
}
