//! Supervisor requests repository
//!
//! Table: supervisor_requests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cap_core::traits::Id;
use cap_core::types::RequestStatus;
use cap_models::SupervisorRequest;
use cap_store::{StoreError, StoreResult, SupervisorRequestStore};
use sqlx::{FromRow, PgPool};

use crate::db_err;

#[derive(Debug, Clone, FromRow)]
struct RequestRow {
    id: i64,
    student_id: i64,
    supervisor_id: i64,
    project_id: Option<i64>,
    message: String,
    status: String,
    supervisor_response: Option<String>,
    created_at: DateTime<Utc>,
    responded_at: Option<DateTime<Utc>>,
}

fn parse_status(status: &str) -> Result<RequestStatus, StoreError> {
    match status {
        "pending" => Ok(RequestStatus::Pending),
        "approved" => Ok(RequestStatus::Approved),
        "rejected" => Ok(RequestStatus::Rejected),
        other => Err(StoreError::Database(format!(
            "unknown request status {:?}",
            other
        ))),
    }
}

impl TryFrom<RequestRow> for SupervisorRequest {
    type Error = StoreError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        Ok(SupervisorRequest {
            id: Some(row.id),
            student_id: row.student_id,
            supervisor_id: row.supervisor_id,
            project_id: row.project_id,
            message: row.message,
            status: parse_status(&row.status)?,
            supervisor_response: row.supervisor_response,
            created_at: Some(row.created_at),
            responded_at: row.responded_at,
        })
    }
}

pub struct PgRequestStore {
    pool: PgPool,
}

impl PgRequestStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SupervisorRequestStore for PgRequestStore {
    async fn insert(&self, request: SupervisorRequest) -> StoreResult<SupervisorRequest> {
        let row = sqlx::query_as::<_, RequestRow>(
            r#"
            INSERT INTO supervisor_requests
                (student_id, supervisor_id, project_id, message, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, student_id, supervisor_id, project_id, message,
                      status, supervisor_response, created_at, responded_at
            "#,
        )
        .bind(request.student_id)
        .bind(request.supervisor_id)
        .bind(request.project_id)
        .bind(&request.message)
        .bind(request.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        row.try_into()
    }

    async fn find(&self, id: Id) -> StoreResult<Option<SupervisorRequest>> {
        let row = sqlx::query_as::<_, RequestRow>(
            r#"
            SELECT id, student_id, supervisor_id, project_id, message,
                   status, supervisor_response, created_at, responded_at
            FROM supervisor_requests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(SupervisorRequest::try_from).transpose()
    }

    async fn pending_exists(
        &self,
        student_id: Id,
        supervisor_id: Id,
        project_id: Option<Id>,
    ) -> StoreResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM supervisor_requests
                WHERE student_id = $1
                  AND supervisor_id = $2
                  AND project_id IS NOT DISTINCT FROM $3
                  AND status = 'pending'
            )
            "#,
        )
        .bind(student_id)
        .bind(supervisor_id)
        .bind(project_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(exists)
    }

    async fn resolve(
        &self,
        id: Id,
        status: RequestStatus,
        response: Option<String>,
        responded_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE supervisor_requests
            SET status = $2, supervisor_response = $3, responded_at = $4
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(response)
        .bind(responded_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected() == 1)
    }
}
